// Type scanning for JVM descriptors and generic signatures

use super::ClassParseError;
use std::collections::BTreeSet;

/// Convert an internal name (`com/foo/Bar`) to a class name (`com.foo.Bar`)
pub fn to_class_name(internal: &str) -> String {
    internal.replace('/', ".")
}

/// Collect every class named in a field or method descriptor,
/// e.g. `(Ljava/lang/String;[Lcom/foo/Bar;)V`
pub fn descriptor_types(descriptor: &str, out: &mut BTreeSet<String>) {
    let bytes = descriptor.as_bytes();
    let mut pos = 0;
    while pos < bytes.len() {
        if bytes[pos] == b'L' {
            let start = pos + 1;
            match bytes[start..].iter().position(|&b| b == b';') {
                Some(len) => {
                    out.insert(to_class_name(&descriptor[start..start + len]));
                    pos = start + len + 1;
                }
                None => return,
            }
        } else {
            pos += 1;
        }
    }
}

/// Collect every class named in a class, method or field signature.
///
/// Handles type parameters, wildcards, type variables and inner class
/// suffixes (`Lcom/foo/Outer<TT;>.Inner;` yields `com.foo.Outer$Inner`).
pub fn signature_types(signature: &str, out: &mut BTreeSet<String>) -> Result<(), ClassParseError> {
    SignatureParser::new(signature, out).parse()
}

struct SignatureParser<'a, 'o> {
    source: &'a str,
    bytes: &'a [u8],
    pos: usize,
    out: &'o mut BTreeSet<String>,
}

impl<'a, 'o> SignatureParser<'a, 'o> {
    fn new(source: &'a str, out: &'o mut BTreeSet<String>) -> Self {
        Self {
            source,
            bytes: source.as_bytes(),
            pos: 0,
            out,
        }
    }

    fn parse(&mut self) -> Result<(), ClassParseError> {
        if self.peek() == Some(b'<') {
            self.type_parameters()?;
        }

        while let Some(b) = self.peek() {
            match b {
                b'(' | b')' | b'^' => self.pos += 1,
                _ => self.java_type()?,
            }
        }

        Ok(())
    }

    fn type_parameters(&mut self) -> Result<(), ClassParseError> {
        self.expect(b'<')?;
        while self.peek() != Some(b'>') {
            // Identifier up to the class bound
            while self.peek().is_some_and(|b| b != b':') {
                self.pos += 1;
            }
            if self.peek().is_none() {
                return Err(self.error());
            }
            while self.peek() == Some(b':') {
                self.pos += 1;
                if matches!(self.peek(), Some(b'L' | b'T' | b'[')) {
                    self.reference_type()?;
                }
            }
        }
        self.expect(b'>')
    }

    fn java_type(&mut self) -> Result<(), ClassParseError> {
        match self.peek() {
            Some(b'B' | b'C' | b'D' | b'F' | b'I' | b'J' | b'S' | b'Z' | b'V') => {
                self.pos += 1;
                Ok(())
            }
            _ => self.reference_type(),
        }
    }

    fn reference_type(&mut self) -> Result<(), ClassParseError> {
        match self.peek() {
            Some(b'L') => self.class_type(),
            Some(b'T') => {
                while self.peek().is_some_and(|b| b != b';') {
                    self.pos += 1;
                }
                self.expect(b';')
            }
            Some(b'[') => {
                self.pos += 1;
                self.java_type()
            }
            _ => Err(self.error()),
        }
    }

    fn class_type(&mut self) -> Result<(), ClassParseError> {
        self.expect(b'L')?;
        let mut name = self.identifier();
        loop {
            match self.peek() {
                Some(b'<') => self.type_arguments()?,
                Some(b'.') => {
                    self.pos += 1;
                    name.push('$');
                    name.push_str(&self.identifier());
                }
                Some(b';') => {
                    self.pos += 1;
                    break;
                }
                _ => return Err(self.error()),
            }
        }
        self.out.insert(to_class_name(&name));
        Ok(())
    }

    fn type_arguments(&mut self) -> Result<(), ClassParseError> {
        self.expect(b'<')?;
        while self.peek() != Some(b'>') {
            match self.peek() {
                Some(b'*') => self.pos += 1,
                Some(b'+' | b'-') => {
                    self.pos += 1;
                    self.reference_type()?;
                }
                Some(_) => self.reference_type()?,
                None => return Err(self.error()),
            }
        }
        self.expect(b'>')
    }

    fn identifier(&mut self) -> String {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|b| !matches!(b, b'<' | b';' | b'.'))
        {
            self.pos += 1;
        }
        self.source[start..self.pos].to_string()
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn expect(&mut self, expected: u8) -> Result<(), ClassParseError> {
        if self.peek() == Some(expected) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.error())
        }
    }

    fn error(&self) -> ClassParseError {
        ClassParseError::InvalidDescriptor(self.source.to_string())
    }
}
