use serde::{Deserialize, Serialize};

use crate::consts::{ClassAccessFlag, FieldAccessFlag, MethodAccessFlag};

bitflags::bitflags! {
    /// Source-level modifiers. Class and member lists carry exactly one of the
    /// four visibility bits; parameter lists are empty.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct ModifierFlags: u16 {
        const PRIVATE = 1 << 0;
        const PROTECTED = 1 << 1;
        const PUBLIC = 1 << 2;
        const PACKAGE_LOCAL = 1 << 3;
        const ABSTRACT = 1 << 4;
        const FINAL = 1 << 5;
        const NATIVE = 1 << 6;
        const STATIC = 1 << 7;
        const SYNCHRONIZED = 1 << 8;
        const TRANSIENT = 1 << 9;
        const VOLATILE = 1 << 10;
        const STRICTFP = 1 << 11;
    }
}

impl ModifierFlags {
    pub fn from_class(access: ClassAccessFlag) -> Self {
        let mut flags = Self::visibility(access.contains(ClassAccessFlag::PUBLIC), false, false);
        flags.set(Self::ABSTRACT, access.contains(ClassAccessFlag::ABSTRACT));
        flags.set(Self::FINAL, access.contains(ClassAccessFlag::FINAL));
        flags
    }

    pub fn from_field(access: FieldAccessFlag) -> Self {
        let mut flags = Self::visibility(
            access.contains(FieldAccessFlag::PUBLIC),
            access.contains(FieldAccessFlag::PROTECTED),
            access.contains(FieldAccessFlag::PRIVATE),
        );
        flags.set(Self::FINAL, access.contains(FieldAccessFlag::FINAL));
        flags.set(Self::STATIC, access.contains(FieldAccessFlag::STATIC));
        flags.set(Self::TRANSIENT, access.contains(FieldAccessFlag::TRANSIENT));
        flags.set(Self::VOLATILE, access.contains(FieldAccessFlag::VOLATILE));
        flags
    }

    pub fn from_method(access: MethodAccessFlag) -> Self {
        let mut flags = Self::visibility(
            access.contains(MethodAccessFlag::PUBLIC),
            access.contains(MethodAccessFlag::PROTECTED),
            access.contains(MethodAccessFlag::PRIVATE),
        );
        flags.set(Self::ABSTRACT, access.contains(MethodAccessFlag::ABSTRACT));
        flags.set(Self::FINAL, access.contains(MethodAccessFlag::FINAL));
        flags.set(Self::NATIVE, access.contains(MethodAccessFlag::NATIVE));
        flags.set(Self::STATIC, access.contains(MethodAccessFlag::STATIC));
        flags.set(
            Self::SYNCHRONIZED,
            access.contains(MethodAccessFlag::SYNCHRONIZED),
        );
        flags.set(Self::STRICTFP, access.contains(MethodAccessFlag::STRICT));
        flags
    }

    // private wins over protected wins over public
    fn visibility(public: bool, protected: bool, private: bool) -> Self {
        if private {
            Self::PRIVATE
        } else if protected {
            Self::PROTECTED
        } else if public {
            Self::PUBLIC
        } else {
            Self::PACKAGE_LOCAL
        }
    }

    pub fn keywords(self) -> impl Iterator<Item = &'static str> {
        [
            (Self::PRIVATE, "private"),
            (Self::PROTECTED, "protected"),
            (Self::PUBLIC, "public"),
            (Self::ABSTRACT, "abstract"),
            (Self::STATIC, "static"),
            (Self::FINAL, "final"),
            (Self::TRANSIENT, "transient"),
            (Self::VOLATILE, "volatile"),
            (Self::SYNCHRONIZED, "synchronized"),
            (Self::NATIVE, "native"),
            (Self::STRICTFP, "strictfp"),
        ]
        .into_iter()
        .filter(move |(flag, _)| self.contains(*flag))
        .map(|(_, keyword)| keyword)
    }
}
