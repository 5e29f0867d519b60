//! # Dynamic Schema
//!
//! The wire types of this crate as a `scalepack::Registry`, for decoding raw
//! payloads by type name when there is no typed value to decode into:
//!
//! ```
//! let registry = querywire::schema::registry().unwrap();
//! let codec = registry.resolve("Option<ForwardCursor>").unwrap();
//! assert_eq!(codec.decode_all(&[0]).unwrap(), scalepack::Value::none());
//! ```
//!
//! Every entry here must produce the same bytes as its typed counterpart;
//! the tests check each envelope both ways.

use scalepack::Codec;
use scalepack::Error;
use scalepack::Param;
use scalepack::Registry;
use scalepack::RegistryBuilder;
use scalepack::Result;
use scalepack::Value;
use scalepack::Variant;

use crate::ids::check_name;
use crate::output::QueryOutputBatchBox;

/// Builds the registry of every wire type.
pub fn registry() -> Result<Registry> {
    let mut builder = Registry::builder();
    scalars(&mut builder)?;
    identifiers(&mut builder)?;
    entities(&mut builder)?;
    predicates(&mut builder)?;
    envelopes(&mut builder)?;
    failures(&mut builder)?;
    builder.build()
}

/// `(discriminant, tag, payload type)`; no payload type means a bare tag.
type VariantRow<'a> = (u8, &'a str, Option<&'a str>);

fn union(name: &str, rows: &[VariantRow<'_>]) -> Result<Codec> {
    let variants = rows.iter().map(|&(discriminant, tag, payload)| match payload {
        Some(expr) => Variant::with(discriminant, tag, Codec::reference(expr)),
        None => Variant::unit(discriminant, tag),
    });
    Codec::union(name, variants)
}

fn record(fields: &[(&str, &str)]) -> Codec {
    Codec::record(fields.iter().map(|&(name, expr)| (name, Codec::reference(expr))))
}

fn scalars(builder: &mut RegistryBuilder) -> Result<()> {
    let name = Codec::refine(Codec::string(), |value| match value {
        Value::Str(s) => check_name(s)
            .map_err(|reason| Error::InvalidValue(format!("name {:?}: {}", s, reason))),
        _ => Ok(()),
    });
    let json = Codec::refine(Codec::string(), |value| match value {
        Value::Str(s) => serde_json::from_str::<serde_json::Value>(s)
            .map(drop)
            .map_err(|e| Error::InvalidValue(format!("json: {}", e))),
        _ => Ok(()),
    });
    builder
        .register("Name", name)?
        .register("Json", json)?
        .register("Metadata", Codec::reference("BTreeMap<Name, Json>"))?
        .register(
            "Numeric",
            Codec::record([("mantissa", Codec::compact()), ("scale", Codec::compact())]),
        )?
        .register("NumericSpec", record(&[("scale", "Option<u32>")]))?
        .register("IpfsPath", Codec::string())?
        .register("Hash", Codec::reference("Array<u8, 32>"))?
        .register("Signature", Codec::bytes())?;
    Ok(())
}

fn identifiers(builder: &mut RegistryBuilder) -> Result<()> {
    let algorithm = union(
        "Algorithm",
        &[
            (0, "Ed25519", None),
            (1, "Secp256k1", None),
            (2, "BlsNormal", None),
            (3, "BlsSmall", None),
        ],
    )?;
    builder
        .register("DomainId", Codec::reference("Name"))?
        .register("RoleId", Codec::reference("Name"))?
        .register("TriggerId", Codec::reference("Name"))?
        .register("Algorithm", algorithm)?
        .register("PublicKey", record(&[("algorithm", "Algorithm"), ("payload", "Bytes")]))?
        .register("AccountId", record(&[("domain", "DomainId"), ("signatory", "PublicKey")]))?
        .register("AssetDefinitionId", record(&[("domain", "DomainId"), ("name", "Name")]))?
        .register(
            "AssetId",
            record(&[("account", "AccountId"), ("definition", "AssetDefinitionId")]),
        )?;
    Ok(())
}

fn entities(builder: &mut RegistryBuilder) -> Result<()> {
    let asset_value = union(
        "AssetValue",
        &[(0, "Numeric", Some("Numeric")), (1, "Store", Some("Metadata"))],
    )?;
    let asset_type =
        union("AssetType", &[(0, "Numeric", Some("NumericSpec")), (1, "Store", None)])?;
    let mintable =
        union("Mintable", &[(0, "Infinitely", None), (1, "Once", None), (2, "Not", None)])?;
    builder
        .register(
            "Domain",
            record(&[
                ("id", "DomainId"),
                ("logo", "Option<IpfsPath>"),
                ("metadata", "Metadata"),
                ("owned_by", "AccountId"),
            ]),
        )?
        .register("Account", record(&[("id", "AccountId"), ("metadata", "Metadata")]))?
        .register("AssetValue", asset_value)?
        .register("Asset", record(&[("id", "AssetId"), ("value", "AssetValue")]))?
        .register("AssetType", asset_type)?
        .register("Mintable", mintable)?
        .register(
            "AssetDefinition",
            record(&[
                ("id", "AssetDefinitionId"),
                ("type", "AssetType"),
                ("mintable", "Mintable"),
                ("logo", "Option<IpfsPath>"),
                ("metadata", "Metadata"),
                ("owned_by", "AccountId"),
                ("total_quantity", "Numeric"),
            ]),
        )?
        .register("Permission", record(&[("name", "String"), ("payload", "Json")]))?
        .register("Role", record(&[("id", "RoleId"), ("permissions", "Vec<Permission>")]))?
        .register("PeerId", record(&[("public_key", "PublicKey")]))?;
    Ok(())
}

fn predicates(builder: &mut RegistryBuilder) -> Result<()> {
    builder.register_factory("CompoundPredicate", 1, |params| {
        let Some(Param::Type(atom)) = params.first() else {
            return Err(Error::BadTypeExpr("CompoundPredicate<A> takes a type".to_owned()));
        };
        let atom = atom.clone();
        Codec::recursive(|this| {
            Codec::union(
                "CompoundPredicate",
                [
                    Variant::with(0, "Atom", atom),
                    Variant::with(1, "Not", this.clone()),
                    Variant::with(2, "And", Codec::list(this.clone())),
                    Variant::with(3, "Or", Codec::list(this)),
                ],
            )
        })
    })?;

    let string_atom = union(
        "StringAtom",
        &[
            (0, "Equals", Some("String")),
            (1, "Contains", Some("String")),
            (2, "StartsWith", Some("String")),
            (3, "EndsWith", Some("String")),
        ],
    )?;
    builder
        .register("StringAtom", string_atom)?
        .register("NamePredicate", union("NamePredicate", &[(0, "Atom", Some("StringAtom"))])?)?
        .register("DomainIdAtom", union("DomainIdAtom", &[(0, "Equals", Some("DomainId"))])?)?
        .register(
            "DomainIdPredicate",
            union(
                "DomainIdPredicate",
                &[(0, "Atom", Some("DomainIdAtom")), (1, "Name", Some("NamePredicate"))],
            )?,
        )?
        .register("JsonAtom", union("JsonAtom", &[(0, "Equals", Some("Json"))])?)?
        .register("JsonPredicate", union("JsonPredicate", &[(0, "Atom", Some("JsonAtom"))])?)?
        .register(
            "MetadataKeyPredicate",
            record(&[("key", "Name"), ("projection", "JsonPredicate")]),
        )?
        .register("MetadataAtom", union("MetadataAtom", &[])?)?
        .register(
            "MetadataPredicate",
            union(
                "MetadataPredicate",
                &[(0, "Atom", Some("MetadataAtom")), (1, "Key", Some("MetadataKeyPredicate"))],
            )?,
        )?
        .register("DomainAtom", union("DomainAtom", &[])?)?
        .register(
            "DomainPredicate",
            union(
                "DomainPredicate",
                &[
                    (0, "Atom", Some("DomainAtom")),
                    (1, "Id", Some("DomainIdPredicate")),
                    (2, "Metadata", Some("MetadataPredicate")),
                ],
            )?,
        )?;
    Ok(())
}

fn envelopes(builder: &mut RegistryBuilder) -> Result<()> {
    // every batch variant is named after the type it holds
    let batches: Vec<String> = QueryOutputBatchBox::VARIANTS
        .iter()
        .map(|(_, tag)| format!("Vec<{}>", tag))
        .collect();
    let rows: Vec<VariantRow<'_>> = QueryOutputBatchBox::VARIANTS
        .iter()
        .zip(&batches)
        .map(|(&(discriminant, tag), expr)| (discriminant, tag, Some(expr.as_str())))
        .collect();
    let batch_box = union("QueryOutputBatchBox", &rows)?;
    let singular_output = union(
        "SingularQueryOutputBox",
        &[(0, "Numeric", Some("Numeric")), (2, "Json", Some("Json"))],
    )?;
    let response = union(
        "QueryResponse",
        &[(0, "Singular", Some("SingularQueryOutputBox")), (1, "Iterable", Some("QueryOutput"))],
    )?;
    builder
        .register("Pagination", record(&[("limit", "Option<NonZero<u64>>"), ("offset", "u64")]))?
        .register("Sorting", record(&[("sort_by_metadata_key", "Option<Name>")]))?
        .register(
            "QueryParams",
            record(&[
                ("pagination", "Pagination"),
                ("sorting", "Sorting"),
                ("fetch_size", "Option<NonZero<u64>>"),
            ]),
        )?
        .register("ForwardCursor", record(&[("query", "String"), ("cursor", "NonZero<u64>")]))?
        .register("QueryOutputBatchBox", batch_box)?
        .register(
            "QueryOutput",
            record(&[
                ("batch", "Vec<QueryOutputBatchBox>"),
                ("remaining_items", "u64"),
                ("continue_cursor", "Option<ForwardCursor>"),
            ]),
        )?
        .register("SingularQueryOutputBox", singular_output)?
        .register("QueryResponse", response)?;
    Ok(())
}

fn failures(builder: &mut RegistryBuilder) -> Result<()> {
    let find = union(
        "FindError",
        &[
            (0, "Asset", Some("AssetId")),
            (1, "AssetDefinition", Some("AssetDefinitionId")),
            (2, "Account", Some("AccountId")),
            (3, "Domain", Some("DomainId")),
            (4, "MetadataKey", Some("Name")),
            (5, "Block", Some("Hash")),
            (6, "Transaction", Some("Hash")),
            (7, "Peer", Some("PeerId")),
            (8, "Trigger", Some("TriggerId")),
            (9, "Role", Some("RoleId")),
            (10, "Permission", Some("Permission")),
            (11, "PublicKey", Some("PublicKey")),
        ],
    )?;
    let execution = union(
        "QueryExecutionFail",
        &[
            (0, "Find", Some("FindError")),
            (1, "Conversion", Some("String")),
            (2, "NotFound", None),
            (3, "CursorMismatch", None),
            (4, "CursorDone", None),
            (5, "FetchSizeTooBig", None),
            (6, "InvalidSingularParameters", None),
            (7, "CapacityLimit", None),
        ],
    )?;
    let validation = union(
        "ValidationFail",
        &[
            (0, "NotPermitted", Some("String")),
            (2, "QueryFailed", Some("QueryExecutionFail")),
            (3, "TooComplex", None),
            (4, "InternalError", None),
        ],
    )?;
    builder
        .register("FindError", find)?
        .register("QueryExecutionFail", execution)?
        .register("ValidationFail", validation)?;
    Ok(())
}
