//! Minimal class-file and jar writers for tests and benchmarks.
//!
//! Produces structurally valid class files with exactly the constants
//! and members that were asked for. Method bodies are never emitted.

use std::collections::HashMap;
use std::io::Write;
use std::path::Path;

const ACC_PUBLIC_SUPER: u16 = 0x0021;

struct Field {
    access: u16,
    name: String,
    descriptor: String,
    signature: Option<String>,
    exceptions: Vec<String>,
}

pub struct ClassBuilder {
    name: String,
    access: u16,
    super_class: Option<String>,
    interfaces: Vec<String>,
    signature: Option<String>,
    fields: Vec<Field>,
    methods: Vec<Field>,
    class_refs: Vec<String>,
    name_and_types: Vec<(String, String)>,
    longs: Vec<i64>,
}

impl ClassBuilder {
    /// Public class with the given internal name extending `java/lang/Object`
    pub fn new(internal_name: &str) -> Self {
        Self {
            name: internal_name.to_string(),
            access: ACC_PUBLIC_SUPER,
            super_class: Some("java/lang/Object".to_string()),
            interfaces: Vec::new(),
            signature: None,
            fields: Vec::new(),
            methods: Vec::new(),
            class_refs: Vec::new(),
            name_and_types: Vec::new(),
            longs: Vec::new(),
        }
    }

    pub fn access(mut self, access: u16) -> Self {
        self.access = access;
        self
    }

    pub fn super_class(mut self, internal_name: &str) -> Self {
        self.super_class = Some(internal_name.to_string());
        self
    }

    pub fn interface(mut self, internal_name: &str) -> Self {
        self.interfaces.push(internal_name.to_string());
        self
    }

    pub fn class_signature(mut self, signature: &str) -> Self {
        self.signature = Some(signature.to_string());
        self
    }

    pub fn field(mut self, access: u16, name: &str, descriptor: &str) -> Self {
        self.fields.push(Field {
            access,
            name: name.to_string(),
            descriptor: descriptor.to_string(),
            signature: None,
            exceptions: Vec::new(),
        });
        self
    }

    pub fn method(self, access: u16, name: &str, descriptor: &str) -> Self {
        self.method_with(access, name, descriptor, None, &[])
    }

    pub fn method_with(
        mut self,
        access: u16,
        name: &str,
        descriptor: &str,
        signature: Option<&str>,
        exceptions: &[&str],
    ) -> Self {
        self.methods.push(Field {
            access,
            name: name.to_string(),
            descriptor: descriptor.to_string(),
            signature: signature.map(str::to_string),
            exceptions: exceptions.iter().map(|e| e.to_string()).collect(),
        });
        self
    }

    /// A `CONSTANT_Class` entry, as emitted for `new`, `checkcast` or a static call
    pub fn class_ref(mut self, internal_name: &str) -> Self {
        self.class_refs.push(internal_name.to_string());
        self
    }

    /// A `CONSTANT_NameAndType` entry, as emitted for a field or method reference
    pub fn name_and_type(mut self, name: &str, descriptor: &str) -> Self {
        self.name_and_types.push((name.to_string(), descriptor.to_string()));
        self
    }

    pub fn long_constant(mut self, value: i64) -> Self {
        self.longs.push(value);
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut pool = PoolWriter::default();

        let this_class = pool.class(&self.name);
        let super_class = self.super_class.as_deref().map(|s| pool.class(s)).unwrap_or(0);
        let interfaces: Vec<u16> = self.interfaces.iter().map(|i| pool.class(i)).collect();
        for value in &self.longs {
            pool.long(*value);
        }
        for class in &self.class_refs {
            pool.class(class);
        }
        for (name, descriptor) in &self.name_and_types {
            pool.name_and_type(name, descriptor);
        }

        let fields: Vec<Vec<u8>> = self.fields.iter().map(|f| member(&mut pool, f)).collect();
        let methods: Vec<Vec<u8>> = self.methods.iter().map(|m| member(&mut pool, m)).collect();
        let class_attributes = self
            .signature
            .as_deref()
            .map(|s| signature_attribute(&mut pool, s));

        let mut out = Vec::new();
        out.extend_from_slice(&0xCAFEBABEu32.to_be_bytes());
        out.extend_from_slice(&0u16.to_be_bytes());
        out.extend_from_slice(&52u16.to_be_bytes());
        out.extend_from_slice(&pool.next_index.to_be_bytes());
        out.extend_from_slice(&pool.bytes);

        out.extend_from_slice(&self.access.to_be_bytes());
        out.extend_from_slice(&this_class.to_be_bytes());
        out.extend_from_slice(&super_class.to_be_bytes());
        out.extend_from_slice(&(interfaces.len() as u16).to_be_bytes());
        for index in interfaces {
            out.extend_from_slice(&index.to_be_bytes());
        }

        out.extend_from_slice(&(fields.len() as u16).to_be_bytes());
        for field in fields {
            out.extend_from_slice(&field);
        }
        out.extend_from_slice(&(methods.len() as u16).to_be_bytes());
        for method in methods {
            out.extend_from_slice(&method);
        }

        match class_attributes {
            Some(attribute) => {
                out.extend_from_slice(&1u16.to_be_bytes());
                out.extend_from_slice(&attribute);
            }
            None => out.extend_from_slice(&0u16.to_be_bytes()),
        }
        out
    }
}

fn member(pool: &mut PoolWriter, field: &Field) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&field.access.to_be_bytes());
    out.extend_from_slice(&pool.utf8(&field.name).to_be_bytes());
    out.extend_from_slice(&pool.utf8(&field.descriptor).to_be_bytes());

    let mut attributes = Vec::new();
    if let Some(signature) = &field.signature {
        attributes.push(signature_attribute(pool, signature));
    }
    if !field.exceptions.is_empty() {
        let mut attribute = Vec::new();
        attribute.extend_from_slice(&pool.utf8("Exceptions").to_be_bytes());
        attribute.extend_from_slice(&(2 + 2 * field.exceptions.len() as u32).to_be_bytes());
        attribute.extend_from_slice(&(field.exceptions.len() as u16).to_be_bytes());
        for exception in &field.exceptions {
            attribute.extend_from_slice(&pool.class(exception).to_be_bytes());
        }
        attributes.push(attribute);
    }

    out.extend_from_slice(&(attributes.len() as u16).to_be_bytes());
    for attribute in attributes {
        out.extend_from_slice(&attribute);
    }
    out
}

fn signature_attribute(pool: &mut PoolWriter, signature: &str) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&pool.utf8("Signature").to_be_bytes());
    out.extend_from_slice(&2u32.to_be_bytes());
    out.extend_from_slice(&pool.utf8(signature).to_be_bytes());
    out
}

struct PoolWriter {
    bytes: Vec<u8>,
    next_index: u16,
    utf8: HashMap<String, u16>,
    classes: HashMap<String, u16>,
}

impl Default for PoolWriter {
    fn default() -> Self {
        Self {
            bytes: Vec::new(),
            next_index: 1,
            utf8: HashMap::new(),
            classes: HashMap::new(),
        }
    }
}

impl PoolWriter {
    fn utf8(&mut self, value: &str) -> u16 {
        if let Some(index) = self.utf8.get(value) {
            return *index;
        }
        self.bytes.push(1);
        self.bytes.extend_from_slice(&(value.len() as u16).to_be_bytes());
        self.bytes.extend_from_slice(value.as_bytes());
        let index = self.take(1);
        self.utf8.insert(value.to_string(), index);
        index
    }

    fn class(&mut self, internal_name: &str) -> u16 {
        if let Some(index) = self.classes.get(internal_name) {
            return *index;
        }
        let name_index = self.utf8(internal_name);
        self.bytes.push(7);
        self.bytes.extend_from_slice(&name_index.to_be_bytes());
        let index = self.take(1);
        self.classes.insert(internal_name.to_string(), index);
        index
    }

    fn name_and_type(&mut self, name: &str, descriptor: &str) -> u16 {
        let name_index = self.utf8(name);
        let descriptor_index = self.utf8(descriptor);
        self.bytes.push(12);
        self.bytes.extend_from_slice(&name_index.to_be_bytes());
        self.bytes.extend_from_slice(&descriptor_index.to_be_bytes());
        self.take(1)
    }

    fn long(&mut self, value: i64) -> u16 {
        self.bytes.push(5);
        self.bytes.extend_from_slice(&value.to_be_bytes());
        self.take(2)
    }

    fn take(&mut self, slots: u16) -> u16 {
        let index = self.next_index;
        self.next_index += slots;
        index
    }
}

/// Write a jar containing the given `(entry path, bytes)` pairs
pub fn write_jar(path: &Path, entries: &[(&str, &[u8])]) -> std::io::Result<()> {
    let file = std::fs::File::create(path)?;
    let mut zip = zip::ZipWriter::new(file);
    let options = zip::write::FileOptions::default().compression_method(zip::CompressionMethod::Deflated);
    for (name, bytes) in entries {
        zip.start_file(*name, options)?;
        zip.write_all(bytes)?;
    }
    zip.finish()?;
    Ok(())
}

/// Write a class into a classes directory at the path matching its name
pub fn write_class(root: &Path, internal_name: &str, bytes: &[u8]) -> std::io::Result<()> {
    let path = root.join(format!("{}.class", internal_name));
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, bytes)
}
