use serde::{Deserialize, Serialize};

pub const ACC_PUBLIC: u16 = 0x0001;
pub const ACC_PRIVATE: u16 = 0x0002;
pub const ACC_PROTECTED: u16 = 0x0004;
pub const ACC_STATIC: u16 = 0x0008;
pub const ACC_FINAL: u16 = 0x0010;
pub const ACC_VARARGS: u16 = 0x0080;
pub const ACC_INTERFACE: u16 = 0x0200;
pub const ACC_ABSTRACT: u16 = 0x0400;

/// Name used for constructors in [`MethodStub::name`].
pub const CONSTRUCTOR_NAME: &str = "<init>";

/// A class as a class file describes it.
///
/// Names are binary names with `.` separators (`java.util.Map$Entry`);
/// descriptors and signatures use the JVM `/` form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassStub {
    pub name: String,
    #[serde(default)]
    pub access_flags: u16,
    #[serde(default)]
    pub super_class: Option<String>,
    #[serde(default)]
    pub interfaces: Vec<String>,
    #[serde(default)]
    pub signature: Option<String>,
    #[serde(default)]
    pub fields: Vec<FieldStub>,
    #[serde(default)]
    pub methods: Vec<MethodStub>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldStub {
    pub name: String,
    #[serde(default)]
    pub access_flags: u16,
    pub descriptor: String,
    #[serde(default)]
    pub signature: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodStub {
    pub name: String,
    #[serde(default)]
    pub access_flags: u16,
    pub descriptor: String,
    #[serde(default)]
    pub signature: Option<String>,
    /// Declared exceptions, used when the signature carries no throws clause.
    #[serde(default)]
    pub exceptions: Vec<String>,
}

/// Top-level shape of a class universe JSON document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UniverseFile {
    #[serde(default)]
    pub classes: Vec<ClassStub>,
}

impl ClassStub {
    /// A public class extending `java.lang.Object`.
    pub fn class(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            access_flags: ACC_PUBLIC,
            super_class: Some("java.lang.Object".to_string()),
            interfaces: Vec::new(),
            signature: None,
            fields: Vec::new(),
            methods: Vec::new(),
        }
    }

    pub fn interface(name: impl Into<String>) -> Self {
        Self {
            access_flags: ACC_PUBLIC | ACC_INTERFACE | ACC_ABSTRACT,
            ..Self::class(name)
        }
    }

    pub fn extends(mut self, super_class: impl Into<String>) -> Self {
        self.super_class = Some(super_class.into());
        self
    }

    pub fn implements(mut self, interface: impl Into<String>) -> Self {
        self.interfaces.push(interface.into());
        self
    }

    pub fn signature(mut self, signature: impl Into<String>) -> Self {
        self.signature = Some(signature.into());
        self
    }

    pub fn access(mut self, access_flags: u16) -> Self {
        self.access_flags = access_flags;
        self
    }

    pub fn field(mut self, field: FieldStub) -> Self {
        self.fields.push(field);
        self
    }

    pub fn method(mut self, method: MethodStub) -> Self {
        self.methods.push(method);
        self
    }

    pub fn is_interface(&self) -> bool {
        self.access_flags & ACC_INTERFACE != 0
    }
}

impl FieldStub {
    pub fn new(name: impl Into<String>, access_flags: u16, descriptor: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            access_flags,
            descriptor: descriptor.into(),
            signature: None,
        }
    }

    pub fn signature(mut self, signature: impl Into<String>) -> Self {
        self.signature = Some(signature.into());
        self
    }
}

impl MethodStub {
    pub fn new(name: impl Into<String>, access_flags: u16, descriptor: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            access_flags,
            descriptor: descriptor.into(),
            signature: None,
            exceptions: Vec::new(),
        }
    }

    pub fn constructor(access_flags: u16, descriptor: impl Into<String>) -> Self {
        Self::new(CONSTRUCTOR_NAME, access_flags, descriptor)
    }

    pub fn signature(mut self, signature: impl Into<String>) -> Self {
        self.signature = Some(signature.into());
        self
    }

    pub fn throws(mut self, exception: impl Into<String>) -> Self {
        self.exceptions.push(exception.into());
        self
    }

    pub fn is_constructor(&self) -> bool {
        self.name == CONSTRUCTOR_NAME
    }
}
