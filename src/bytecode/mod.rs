// Class file reading
//
// Only the parts of the format that name other types are decoded:
// the constant pool, supertypes, member descriptors, generic signatures
// and declared exceptions. Code attributes are skipped wholesale since
// every type an instruction touches is already in the constant pool.

mod classfile;
mod signature;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use classfile::{
    ClassFile, ClassParseError, Member, ACC_MODULE, ACC_PRIVATE, ACC_PROTECTED, ACC_PUBLIC, ACC_SYNTHETIC,
};
pub use signature::{descriptor_types, signature_types, to_class_name};

/// Name of the class stored at a jar entry or relative file path, if it is one.
///
/// Multi-release entries (`META-INF/versions/11/com/foo/Bar.class`) map to
/// their base name. Other `META-INF` content and module descriptors are not classes.
pub fn class_name_from_entry(entry: &str) -> Option<String> {
    let entry = entry.trim_start_matches('/').replace('\\', "/");
    let stem = entry.strip_suffix(".class")?;

    let stem = match stem.strip_prefix("META-INF/") {
        Some(rest) => {
            let versioned = rest.strip_prefix("versions/")?;
            let (version, name) = versioned.split_once('/')?;
            if version.is_empty() || !version.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            name
        }
        None => stem,
    };

    if stem.is_empty() || stem == "module-info" || stem.ends_with("/module-info") || stem.ends_with("package-info") {
        return None;
    }
    Some(to_class_name(stem))
}
