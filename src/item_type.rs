//! The legacy rustdoc item-kind table.
//!
//! Entry and parent rows tag items with a small integer; the search widget
//! mapped the same codes to CSS classes and to the `kind:` filter names users
//! type into the search box. The table below is the one shipped by the
//! toolchains that emitted this index format.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Item kind codes as they appear in index rows.
///
/// Discriminants are the wire codes; they are stable across every toolchain
/// that produced this format and must never be reordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum ItemType {
    Module = 0,
    ExternCrate = 1,
    Import = 2,
    Struct = 3,
    Enum = 4,
    Function = 5,
    Typedef = 6,
    Static = 7,
    Trait = 8,
    Impl = 9,
    TyMethod = 10,
    Method = 11,
    StructField = 12,
    Variant = 13,
    Macro = 14,
    Primitive = 15,
    AssocType = 16,
    Constant = 17,
    AssocConst = 18,
    Union = 19,
    ForeignType = 20,
    Keyword = 21,
    OpaqueTy = 22,
    ProcAttribute = 23,
    ProcDerive = 24,
    TraitAlias = 25,
}

/// All kinds in code order. Index in this slice == wire code.
const ALL: [ItemType; 26] = [
    ItemType::Module,
    ItemType::ExternCrate,
    ItemType::Import,
    ItemType::Struct,
    ItemType::Enum,
    ItemType::Function,
    ItemType::Typedef,
    ItemType::Static,
    ItemType::Trait,
    ItemType::Impl,
    ItemType::TyMethod,
    ItemType::Method,
    ItemType::StructField,
    ItemType::Variant,
    ItemType::Macro,
    ItemType::Primitive,
    ItemType::AssocType,
    ItemType::Constant,
    ItemType::AssocConst,
    ItemType::Union,
    ItemType::ForeignType,
    ItemType::Keyword,
    ItemType::OpaqueTy,
    ItemType::ProcAttribute,
    ItemType::ProcDerive,
    ItemType::TraitAlias,
];

impl ItemType {
    /// Look up a kind by its wire code.
    pub fn from_code(code: u32) -> Option<Self> {
        ALL.get(code as usize).copied()
    }

    /// The wire code written into index rows.
    #[inline]
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// The filter name used by the search widget (`fn:`, `struct:`, ...).
    ///
    /// These double as the widget's CSS class names, so they match the
    /// original table exactly, including the historical spellings
    /// (`existential` for opaque types, `import` for `use`).
    pub const fn filter_name(self) -> &'static str {
        match self {
            Self::Module => "mod",
            Self::ExternCrate => "externcrate",
            Self::Import => "import",
            Self::Struct => "struct",
            Self::Enum => "enum",
            Self::Function => "fn",
            Self::Typedef => "type",
            Self::Static => "static",
            Self::Trait => "trait",
            Self::Impl => "impl",
            Self::TyMethod => "tymethod",
            Self::Method => "method",
            Self::StructField => "structfield",
            Self::Variant => "variant",
            Self::Macro => "macro",
            Self::Primitive => "primitive",
            Self::AssocType => "associatedtype",
            Self::Constant => "constant",
            Self::AssocConst => "associatedconstant",
            Self::Union => "union",
            Self::ForeignType => "foreigntype",
            Self::Keyword => "keyword",
            Self::OpaqueTy => "existential",
            Self::ProcAttribute => "attr",
            Self::ProcDerive => "derive",
            Self::TraitAlias => "traitalias",
        }
    }

    /// Look up a kind by its filter name (case-sensitive, as the widget was).
    pub fn from_filter_name(name: &str) -> Option<Self> {
        ALL.iter().copied().find(|ty| ty.filter_name() == name)
    }

    /// Whether rows of this kind may appear in a parent table and own
    /// child entries (methods, fields, variants, associated items).
    pub const fn can_own_members(self) -> bool {
        matches!(
            self,
            Self::Struct
                | Self::Enum
                | Self::Trait
                | Self::Typedef
                | Self::Union
                | Self::Primitive
                | Self::ForeignType
        )
    }

}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.filter_name())
    }
}

impl Serialize for ItemType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.filter_name())
    }
}

impl<'de> Deserialize<'de> for ItemType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        Self::from_filter_name(&name)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown item kind '{}'", name)))
    }
}
