//! One-off conversion of a single configuration file

use mcpx_scanner::{FileFormat, Formats, Tool};

use super::engine::convert_item;
use super::error::{FailureStage, ItemFailure, MigrationError};

/// Convert one file's content from `from`'s native shape to `to`'s
///
/// The input format is taken from `file_name`'s extension when given, and
/// sniffed otherwise. Output uses `output`, or the target tool's default.
///
/// # Errors
/// Returns an error if the content cannot be decoded, or a pipeline stage
/// fails
pub fn convert(
    content: &str,
    file_name: Option<&str>,
    from: Tool,
    to: Tool,
    output: Option<FileFormat>,
) -> Result<String, MigrationError> {
    let preferred = file_name.and_then(Formats::detect_by_extension);
    let (_, value) = Formats::decode_lenient(preferred, content)?;

    let source = from
        .adapter()
        .from_native(value, from.id())
        .ok_or_else(|| {
            MigrationError::Conversion(ItemFailure {
                item_id: None,
                stage: FailureStage::ParseSource,
                message: format!("Content is not a {from} collection"),
            })
        })?;
    let (converted, _) = convert_item(&source, from, to).map_err(MigrationError::Conversion)?;

    let format = output.unwrap_or_else(|| to.default_format());
    Formats::serialize(&converted, format, to).ok_or_else(|| {
        MigrationError::Conversion(ItemFailure::item(
            &converted.id,
            FailureStage::SerializeTarget,
            format!("Could not write {to} {format}"),
        ))
    })
}
