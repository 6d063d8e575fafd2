use super::signature::{descriptor_types, signature_types, to_class_name};
use std::collections::BTreeSet;
use thiserror::Error;
use tracing::trace;

pub const ACC_PUBLIC: u16 = 0x0001;
pub const ACC_PRIVATE: u16 = 0x0002;
pub const ACC_PROTECTED: u16 = 0x0004;
pub const ACC_SYNTHETIC: u16 = 0x1000;
pub const ACC_MODULE: u16 = 0x8000;

#[derive(Debug, Error)]
pub enum ClassParseError {
    #[error("unexpected end of class file")]
    UnexpectedEof,
    #[error("invalid class file magic header")]
    InvalidMagic,
    #[error("unsupported constant pool tag {tag}")]
    UnsupportedConstant { tag: u8 },
    #[error("invalid constant pool index {index}")]
    InvalidConstantIndex { index: u16 },
    #[error("malformed descriptor: {0}")]
    InvalidDescriptor(String),
}

/// A field or method of a parsed class
#[derive(Debug, Clone)]
pub struct Member {
    pub access_flags: u16,
    pub name: String,
    pub descriptor: String,
    pub signature: Option<String>,
    /// Declared checked exceptions (methods only), as class names
    pub exceptions: Vec<String>,
}

impl Member {
    /// Public or protected and compiler-visible
    pub fn is_api(&self) -> bool {
        self.access_flags & (ACC_PUBLIC | ACC_PROTECTED) != 0 && self.access_flags & ACC_SYNTHETIC == 0
    }
}

/// The parts of a class file that carry type references
#[derive(Debug, Clone)]
pub struct ClassFile {
    /// Binary class name, dot separated (`com.foo.Outer$Inner`)
    pub name: String,
    pub access_flags: u16,
    pub super_class: Option<String>,
    pub interfaces: Vec<String>,
    pub signature: Option<String>,
    pub fields: Vec<Member>,
    pub methods: Vec<Member>,

    /// Internal names of every `CONSTANT_Class` entry
    pool_classes: Vec<String>,

    /// Descriptors reachable from `NameAndType` and `MethodType` entries
    pool_descriptors: Vec<String>,
}

impl ClassFile {
    pub fn parse(bytes: &[u8]) -> Result<Self, ClassParseError> {
        let mut reader = ClassReader::new(bytes);
        reader.expect_magic()?;
        let _minor_version = reader.read_u2()?;
        let _major_version = reader.read_u2()?;
        let pool = ConstantPool::parse(&mut reader)?;

        let access_flags = reader.read_u2()?;
        let this_class = reader.read_u2()?;
        let super_index = reader.read_u2()?;

        let interfaces_count = reader.read_u2()?;
        let mut interfaces = Vec::with_capacity(interfaces_count as usize);
        for _ in 0..interfaces_count {
            let index = reader.read_u2()?;
            interfaces.push(to_class_name(pool.class_name(index)?));
        }

        let fields_count = reader.read_u2()?;
        let mut fields = Vec::with_capacity(fields_count as usize);
        for _ in 0..fields_count {
            fields.push(read_member(&mut reader, &pool)?);
        }

        let methods_count = reader.read_u2()?;
        let mut methods = Vec::with_capacity(methods_count as usize);
        for _ in 0..methods_count {
            methods.push(read_member(&mut reader, &pool)?);
        }

        let attributes = read_attributes(&mut reader, &pool)?;

        let name = if access_flags & ACC_MODULE != 0 {
            "module-info".to_string()
        } else {
            to_class_name(pool.class_name(this_class)?)
        };
        let super_class = if super_index == 0 {
            None
        } else {
            Some(to_class_name(pool.class_name(super_index)?))
        };

        Ok(Self {
            name,
            access_flags,
            super_class,
            interfaces,
            signature: attributes.signature,
            fields,
            methods,
            pool_classes: pool.classes()?,
            pool_descriptors: pool.descriptors()?,
        })
    }

    pub fn is_public(&self) -> bool {
        self.access_flags & ACC_PUBLIC != 0
    }

    pub fn is_module_info(&self) -> bool {
        self.access_flags & ACC_MODULE != 0
    }

    /// Every class this class refers to anywhere in its bytecode
    pub fn referenced_classes(&self) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        if self.is_module_info() {
            return out;
        }

        for class in &self.pool_classes {
            if class.starts_with('[') {
                descriptor_types(class, &mut out);
            } else {
                out.insert(to_class_name(class));
            }
        }
        for descriptor in &self.pool_descriptors {
            descriptor_types(descriptor, &mut out);
        }
        for member in self.fields.iter().chain(&self.methods) {
            descriptor_types(&member.descriptor, &mut out);
            self.add_signature(member.signature.as_deref(), &mut out);
        }
        self.add_signature(self.signature.as_deref(), &mut out);

        out.remove(&self.name);
        out
    }

    /// Classes that appear in the public surface: supertypes and the
    /// signatures of public or protected members of a public class
    pub fn api_classes(&self) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        if !self.is_public() || self.is_module_info() {
            return out;
        }

        out.extend(self.super_class.iter().cloned());
        out.extend(self.interfaces.iter().cloned());
        self.add_signature(self.signature.as_deref(), &mut out);

        for member in self.fields.iter().chain(&self.methods).filter(|m| m.is_api()) {
            descriptor_types(&member.descriptor, &mut out);
            self.add_signature(member.signature.as_deref(), &mut out);
            out.extend(member.exceptions.iter().cloned());
        }

        out.remove(&self.name);
        out
    }

    fn add_signature(&self, signature: Option<&str>, out: &mut BTreeSet<String>) {
        if let Some(signature) = signature {
            if let Err(e) = signature_types(signature, out) {
                trace!("Ignoring signature in {}: {}", self.name, e);
            }
        }
    }
}

#[derive(Default)]
struct Attributes {
    signature: Option<String>,
    exceptions: Vec<String>,
}

fn read_member(reader: &mut ClassReader<'_>, pool: &ConstantPool) -> Result<Member, ClassParseError> {
    let access_flags = reader.read_u2()?;
    let name_index = reader.read_u2()?;
    let descriptor_index = reader.read_u2()?;
    let attributes = read_attributes(reader, pool)?;

    Ok(Member {
        access_flags,
        name: pool.utf8(name_index)?.to_string(),
        descriptor: pool.utf8(descriptor_index)?.to_string(),
        signature: attributes.signature,
        exceptions: attributes.exceptions,
    })
}

fn read_attributes(reader: &mut ClassReader<'_>, pool: &ConstantPool) -> Result<Attributes, ClassParseError> {
    let mut attributes = Attributes::default();
    let count = reader.read_u2()?;
    for _ in 0..count {
        let name_index = reader.read_u2()?;
        let length = reader.read_u4()? as usize;
        let body = reader.read_slice(length)?;
        match pool.utf8(name_index)? {
            "Signature" => {
                let mut sub = ClassReader::new(body);
                let index = sub.read_u2()?;
                attributes.signature = Some(pool.utf8(index)?.to_string());
            }
            "Exceptions" => {
                let mut sub = ClassReader::new(body);
                let exceptions = sub.read_u2()?;
                for _ in 0..exceptions {
                    let index = sub.read_u2()?;
                    attributes.exceptions.push(to_class_name(pool.class_name(index)?));
                }
            }
            _ => {}
        }
    }
    Ok(attributes)
}

#[derive(Debug, Clone)]
enum Constant {
    Utf8(String),
    Class { name_index: u16 },
    NameAndType { descriptor_index: u16 },
    MethodType { descriptor_index: u16 },
    Other,
    Unusable,
}

struct ConstantPool {
    entries: Vec<Constant>,
}

impl ConstantPool {
    fn parse(reader: &mut ClassReader<'_>) -> Result<Self, ClassParseError> {
        let count = reader.read_u2()? as usize;
        let mut entries = Vec::with_capacity(count);
        entries.push(Constant::Unusable); // index 0 unused

        let mut index = 1;
        while index < count {
            let tag = reader.read_u1()?;
            let entry = match tag {
                1 => {
                    let length = reader.read_u2()? as usize;
                    let bytes = reader.read_slice(length)?;
                    // Modified UTF-8 only differs for NUL and supplementary
                    // characters, which never occur in type names.
                    Constant::Utf8(String::from_utf8_lossy(bytes).into_owned())
                }
                3 | 4 => {
                    reader.skip(4)?;
                    Constant::Other
                }
                5 | 6 => {
                    // Longs and doubles take two slots
                    reader.skip(8)?;
                    entries.push(Constant::Other);
                    index += 1;
                    Constant::Unusable
                }
                7 => Constant::Class {
                    name_index: reader.read_u2()?,
                },
                8 | 19 | 20 => {
                    reader.skip(2)?;
                    Constant::Other
                }
                16 => Constant::MethodType {
                    descriptor_index: reader.read_u2()?,
                },
                9 | 10 | 11 | 17 | 18 => {
                    reader.skip(4)?;
                    Constant::Other
                }
                12 => {
                    let _name_index = reader.read_u2()?;
                    Constant::NameAndType {
                        descriptor_index: reader.read_u2()?,
                    }
                }
                15 => {
                    reader.skip(3)?;
                    Constant::Other
                }
                other => return Err(ClassParseError::UnsupportedConstant { tag: other }),
            };

            entries.push(entry);
            index += 1;
        }

        Ok(Self { entries })
    }

    fn get(&self, index: u16) -> Result<&Constant, ClassParseError> {
        self.entries
            .get(index as usize)
            .ok_or(ClassParseError::InvalidConstantIndex { index })
    }

    fn utf8(&self, index: u16) -> Result<&str, ClassParseError> {
        match self.get(index)? {
            Constant::Utf8(value) => Ok(value.as_str()),
            _ => Err(ClassParseError::InvalidConstantIndex { index }),
        }
    }

    fn class_name(&self, index: u16) -> Result<&str, ClassParseError> {
        match self.get(index)? {
            Constant::Class { name_index } => self.utf8(*name_index),
            _ => Err(ClassParseError::InvalidConstantIndex { index }),
        }
    }

    fn classes(&self) -> Result<Vec<String>, ClassParseError> {
        self.entries
            .iter()
            .filter_map(|entry| match entry {
                Constant::Class { name_index } => Some(self.utf8(*name_index).map(str::to_string)),
                _ => None,
            })
            .collect()
    }

    fn descriptors(&self) -> Result<Vec<String>, ClassParseError> {
        self.entries
            .iter()
            .filter_map(|entry| match entry {
                Constant::NameAndType { descriptor_index } | Constant::MethodType { descriptor_index } => {
                    Some(self.utf8(*descriptor_index).map(str::to_string))
                }
                _ => None,
            })
            .collect()
    }
}

struct ClassReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ClassReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn expect_magic(&mut self) -> Result<(), ClassParseError> {
        const MAGIC: u32 = 0xCAFEBABE;
        if self.read_u4()? != MAGIC {
            return Err(ClassParseError::InvalidMagic);
        }
        Ok(())
    }

    fn read_u1(&mut self) -> Result<u8, ClassParseError> {
        let value = *self.data.get(self.pos).ok_or(ClassParseError::UnexpectedEof)?;
        self.pos += 1;
        Ok(value)
    }

    fn read_u2(&mut self) -> Result<u16, ClassParseError> {
        let bytes = self.read_slice(2)?;
        Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    fn read_u4(&mut self) -> Result<u32, ClassParseError> {
        let bytes = self.read_slice(4)?;
        Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    fn read_slice(&mut self, len: usize) -> Result<&'a [u8], ClassParseError> {
        if self.pos + len > self.data.len() {
            return Err(ClassParseError::UnexpectedEof);
        }
        let slice = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    fn skip(&mut self, len: usize) -> Result<(), ClassParseError> {
        self.read_slice(len).map(|_| ())
    }
}
