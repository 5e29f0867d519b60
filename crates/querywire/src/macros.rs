/// Declares an atom type with no variants.
///
/// Used for projections whose entity has nothing to compare on directly; the
/// type can never be constructed, so an `Atom` of it never reaches the wire.
macro_rules! empty_atom {
    ($($(#[$meta:meta])* $name:ident),+ $(,)?) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, PartialEq, Eq)]
            pub enum $name {}

            impl scalepack::Encode for $name {
                fn encode_to(&self, _out: &mut Vec<u8>) {
                    match *self {}
                }
            }

            impl scalepack::Decode for $name {
                fn decode(cur: &mut scalepack::Cursor<'_>) -> scalepack::Result<Self> {
                    Err(scalepack::Error::UnknownDiscriminant {
                        ty: stringify!($name).into(),
                        discriminant: cur.read_byte()?,
                    })
                }
            }
        )+
    };
}

pub(crate) use empty_atom;

/// Every output batch variant with the item type it carries.
///
/// Discriminants follow the ledger's full table, gaps included, like the
/// singular boxes do.
macro_rules! for_each_batch {
    ($m:ident) => {
        $m! {
            PublicKey(crate::ids::PublicKey) = 0,
            String(String) = 1,
            Metadata(crate::value::Metadata) = 2,
            Json(crate::value::Json) = 3,
            Numeric(crate::value::Numeric) = 4,
            Name(crate::ids::Name) = 5,
            DomainId(crate::ids::DomainId) = 6,
            Domain(crate::entity::Domain) = 7,
            AccountId(crate::ids::AccountId) = 8,
            Account(crate::entity::Account) = 9,
            AssetId(crate::ids::AssetId) = 10,
            Asset(crate::entity::Asset) = 11,
            AssetValue(crate::entity::AssetValue) = 12,
            AssetDefinitionId(crate::ids::AssetDefinitionId) = 13,
            AssetDefinition(crate::entity::AssetDefinition) = 14,
            Role(crate::entity::Role) = 15,
            // 16 and 18..=21 belong to kinds this crate has no query for
            Permission(crate::entity::Permission) = 17,
            PeerId(crate::entity::PeerId) = 22,
            RoleId(crate::ids::RoleId) = 23,
            TriggerId(crate::ids::TriggerId) = 24,
        }
    };
}

pub(crate) use for_each_batch;
