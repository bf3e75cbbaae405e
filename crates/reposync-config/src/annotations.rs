use std::any::type_name;

use documented::{Documented, DocumentedFields};
use toml_edit::{ArrayOfTables, Decor, Item, RawString, Table};
use tracing::warn;

use crate::error::{ConfigError, Result};

/// Appends `docs` as `# ` comment lines to the comment block held by `decor`.
///
/// A separating `#` line is inserted when `decor` already ends in a comment.
pub fn append_docs_as_toml_comments(decor: &mut Decor, docs: &str) {
    let existing = decor
        .prefix()
        .and_then(RawString::as_str)
        .unwrap_or_default()
        .to_string();

    let mut prefix = existing.clone();
    if existing.lines().last().is_some_and(|line| !line.is_empty()) {
        if !existing.ends_with('\n') {
            prefix.push('\n');
        }
        prefix.push_str("#\n");
    }
    for line in docs.lines() {
        if line.is_empty() {
            prefix.push_str("#\n");
        } else {
            prefix.push_str("# ");
            prefix.push_str(line);
            prefix.push('\n');
        }
    }
    decor.set_prefix(prefix);
}

// Decor a key's docs attach to; tables carry their own header decor.
fn docs_decor<'a>(key_decor: &'a mut Decor, item: &'a mut Item) -> Option<&'a mut Decor> {
    match item {
        Item::None => None,
        Item::Value(_) => Some(key_decor),
        Item::Table(table) => Some(table.decor_mut()),
        Item::ArrayOfTables(array) => array.iter_mut().next().map(Table::decor_mut),
    }
}

/// Writes the field docs of `T` above each key of `table`.
///
/// The container docs of `T` are only added for nested tables; the root is
/// described by the document header instead.
pub fn annotate_toml_table<T>(table: &mut Table, is_root: bool) -> Result<()>
where
    T: Documented + DocumentedFields,
{
    if !is_root {
        append_docs_as_toml_comments(table.decor_mut(), T::DOCS);
    }

    for (mut key, item) in table.iter_mut() {
        let name = key.get().to_string();
        let Ok(docs) = T::get_field_docs(&name) else {
            warn!("No documentation for '{name}' on {}", type_name::<T>());
            continue;
        };

        if item.is_none() {
            return Err(ConfigError::UnexpectedTomlItem(name));
        }
        if let Some(decor) = docs_decor(key.leaf_decor_mut(), item) {
            append_docs_as_toml_comments(decor, docs);
        }
    }

    Ok(())
}

/// Annotates the first table of an array of tables; the rest share its shape.
pub fn annotate_toml_array_of_tables<T>(array: &mut ArrayOfTables) -> Result<()>
where
    T: Documented + DocumentedFields,
{
    match array.iter_mut().next() {
        Some(first) => {
            annotate_toml_table::<T>(first, false)
                .map_err(|err| ConfigError::AnnotateFirstTable(err.to_string()))
        }
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use toml_edit::Decor;

    use super::*;

    #[test]
    fn test_append_docs_as_toml_comments() {
        let mut decor = Decor::new("", "");
        append_docs_as_toml_comments(&mut decor, "Test documentation");

        let prefix = decor.prefix().and_then(|p| p.as_str()).unwrap();
        assert_eq!(prefix, "# Test documentation\n");
    }

    #[test]
    fn test_append_docs_multiline() {
        let mut decor = Decor::new("", "");
        append_docs_as_toml_comments(&mut decor, "Line 1\n\nLine 2");

        let prefix = decor.prefix().and_then(|p| p.as_str()).unwrap();
        assert_eq!(prefix, "# Line 1\n#\n# Line 2\n");
    }

    #[test]
    fn test_append_docs_after_existing_comment() {
        let mut decor = Decor::new("# header\n", "");
        append_docs_as_toml_comments(&mut decor, "Field docs");

        let prefix = decor.prefix().and_then(|p| p.as_str()).unwrap();
        assert_eq!(prefix, "# header\n#\n# Field docs\n");
    }
}
