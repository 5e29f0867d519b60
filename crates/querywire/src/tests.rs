use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::fmt::Debug;
use std::num::NonZeroU64;

use proptest::prelude::*;
use scalepack::Decode;
use scalepack::Encode;
use scalepack::Registry;
use scalepack::Value;

use crate::Error;
use crate::Result;
use crate::builder::QueryBuilder;
use crate::entity::Domain;
use crate::entity::Permission;
use crate::failure::FindError;
use crate::failure::QueryExecutionFail;
use crate::failure::ValidationFail;
use crate::frame::QueryRequest;
use crate::frame::QueryRequestWithAuthority;
use crate::frame::QueryResponse;
use crate::frame::SignedQuery;
use crate::ids::AccountId;
use crate::ids::Algorithm;
use crate::ids::AssetDefinitionId;
use crate::ids::AssetId;
use crate::ids::Hash;
use crate::ids::Name;
use crate::ids::PublicKey;
use crate::ids::Signature;
use crate::output::ForwardCursor;
use crate::output::QueryOutput;
use crate::output::QueryOutputBatchBox;
use crate::output::Selected;
use crate::predicate::CompoundPredicate;
use crate::predicate::DomainIdPredicate;
use crate::predicate::DomainPredicate;
use crate::predicate::MetadataPredicate;
use crate::predicate::NamePredicate;
use crate::query::FindAccounts;
use crate::query::FindAssetQuantityById;
use crate::query::FindDomainMetadata;
use crate::query::FindDomains;
use crate::query::Pagination;
use crate::query::QueryBox;
use crate::query::QueryParams;
use crate::query::SingularQuery;
use crate::query::SingularQueryOutputBox;
use crate::schema;
use crate::selector::AccountSelector;
use crate::selector::MetadataSelector;
use crate::value::Json;
use crate::value::Metadata;
use crate::value::Numeric;

type R<T> = Result<T>;

fn nz(n: u64) -> NonZeroU64 {
    NonZeroU64::new(n).expect("non-zero literal")
}

fn key(fill: u8) -> PublicKey {
    PublicKey::new(Algorithm::Ed25519, vec![fill; 32])
}

fn account(fill: u8, domain: &str) -> R<AccountId> {
    Ok(AccountId::new(key(fill), domain.parse()?))
}

fn domain(name: &str, owner: &AccountId) -> R<Domain> {
    Ok(Domain {
        id: name.parse()?,
        logo: None,
        metadata: Metadata::new(),
        owned_by: owner.clone(),
    })
}

// ==== IDENTIFIERS ====

#[test]
fn test_name_rejects_reserved() {
    for bad in ["", "two words", "alice@wonderland", "rose#wonderland", "tab\there"] {
        assert!(matches!(Name::new(bad), Err(Error::InvalidName { .. })), "{:?}", bad);
    }
    assert!(Name::new("wonderland").is_ok());
}

#[test]
fn test_name_decode_validates() {
    let bytes = "bad name".to_owned().encode();
    let err = scalepack::decode_all::<Name>(&bytes).unwrap_err();
    assert!(matches!(err, scalepack::Error::InvalidValue(_)));
}

#[test]
fn test_public_key_multihash() -> R<()> {
    let key = key(0xab);
    let text = key.to_string();
    assert!(text.starts_with("ed0120"));
    assert_eq!(&text[6..], "AB".repeat(32));
    assert_eq!(text.parse::<PublicKey>()?, key);
    assert!(matches!("ed0121ab".parse::<PublicKey>(), Err(Error::InvalidPublicKey { .. })));
    assert!(matches!("ff0100".parse::<PublicKey>(), Err(Error::InvalidPublicKey { .. })));
    Ok(())
}

#[test]
fn test_account_id_text() -> R<()> {
    let alice = account(1, "wonderland")?;
    let text = alice.to_string();
    assert!(text.ends_with("@wonderland"));
    assert_eq!(text.parse::<AccountId>()?, alice);
    assert!("wonderland".parse::<AccountId>().is_err());
    Ok(())
}

#[test]
fn test_account_id_field_order() -> R<()> {
    let bytes = account(1, "wonderland")?.encode();
    assert_eq!(bytes[0], 10 << 2);
    assert_eq!(&bytes[1..11], b"wonderland");
    assert_eq!(bytes[11], Algorithm::Ed25519.discriminant());
    assert_eq!(bytes[12], 32 << 2);
    assert_eq!(bytes.len(), 13 + 32);
    Ok(())
}

#[test]
fn test_asset_id_text() -> R<()> {
    let alice = account(1, "wonderland")?;
    let rose = AssetId::new("rose#wonderland".parse()?, alice.clone());
    let short = rose.to_string();
    assert!(short.starts_with("rose##"));
    assert_eq!(short.parse::<AssetId>()?, rose);

    let tulip = AssetId::new("tulip#garden".parse()?, alice);
    let long = tulip.to_string();
    assert!(long.starts_with("tulip#garden#"));
    assert_eq!(long.parse::<AssetId>()?, tulip);
    assert_eq!(tulip.definition, "tulip#garden".parse::<AssetDefinitionId>()?);
    Ok(())
}

#[test]
fn test_hash_text() -> R<()> {
    let hash = Hash::new([0x5a; 32]);
    assert_eq!(hash.to_string().parse::<Hash>()?, hash);
    assert_eq!(hash.encode().len(), Hash::LEN);
    assert!("5a5a".parse::<Hash>().is_err());
    Ok(())
}

// ==== VALUES ====

#[test]
fn test_json_must_parse() -> R<()> {
    let json: Json = r#"{"level": 3}"#.parse()?;
    assert_eq!(json.value()?["level"], 3);
    assert!(matches!("{level".parse::<Json>(), Err(Error::InvalidJson(_))));

    let bytes = "{level".to_owned().encode();
    assert!(matches!(
        scalepack::decode_all::<Json>(&bytes),
        Err(scalepack::Error::InvalidValue(_)),
    ));
    Ok(())
}

#[test]
fn test_numeric_text() -> R<()> {
    let price: Numeric = "12.50".parse()?;
    assert_eq!(price, Numeric::new(1250, 2));
    assert_eq!(price.to_string(), "12.50");
    assert_eq!("0.05".parse::<Numeric>()?.to_string(), "0.05");
    assert_eq!(Numeric::from(7u32).to_string(), "7");
    for bad in ["", "1.", ".5", "1.2.3", "-1", "abc"] {
        assert!(matches!(bad.parse::<Numeric>(), Err(Error::InvalidNumeric(_))), "{:?}", bad);
    }
    Ok(())
}

#[test]
fn test_numeric_encoding() -> R<()> {
    let bytes = Numeric::new(1250, 2).encode();
    assert_eq!(bytes, vec![0x89, 0x13, 0x08]);
    assert_eq!(scalepack::decode_all::<Numeric>(&bytes)?, Numeric::new(1250, 2));
    Ok(())
}

#[test]
fn test_metadata_sorted_by_key() -> R<()> {
    let metadata: Metadata = [
        (Name::new("zeta")?, Json::from(serde_json::json!(1))),
        (Name::new("alpha")?, Json::from(serde_json::json!(2))),
    ]
    .into_iter()
    .collect();
    let bytes = metadata.encode();
    assert_eq!(bytes[0], 2 << 2);
    assert_eq!(&bytes[1..7], b"\x14alpha");
    Ok(())
}

// ==== PREDICATES ====

#[test]
fn test_predicate_neutral_elements() {
    assert_eq!(CompoundPredicate::<DomainPredicate>::PASS.encode(), vec![2, 0]);
    assert_eq!(CompoundPredicate::<DomainPredicate>::FAIL.encode(), vec![3, 0]);
    assert_eq!(CompoundPredicate::<DomainPredicate>::default(), CompoundPredicate::PASS);
}

#[test]
fn test_predicate_projection_bytes() {
    let predicate = CompoundPredicate::atom(DomainPredicate::Id(DomainIdPredicate::Name(
        NamePredicate::starts_with("w"),
    )));
    assert_eq!(predicate.encode(), vec![0, 1, 1, 0, 2, 4, b'w']);
}

#[test]
fn test_predicate_combinators_flatten() -> R<()> {
    let a = CompoundPredicate::atom(DomainPredicate::id_equals("a".parse()?));
    let b = CompoundPredicate::atom(DomainPredicate::id_equals("b".parse()?));
    let c = CompoundPredicate::atom(DomainPredicate::id_equals("c".parse()?));

    let all = a.clone().and(b.clone()).and(c.clone());
    assert_eq!(all, CompoundPredicate::And(vec![a.clone(), b.clone(), c.clone()]));

    let any = a.clone().or(b.clone()).or(c);
    assert!(matches!(&any, CompoundPredicate::Or(items) if items.len() == 3));

    let none = a.not();
    assert_eq!(none.encode()[0], 1);
    assert_eq!(scalepack::decode_all::<CompoundPredicate<DomainPredicate>>(&none.encode())?, none);
    Ok(())
}

#[test]
fn test_empty_atom_never_decodes() {
    let err = scalepack::decode_all::<CompoundPredicate<DomainPredicate>>(&[0, 0, 0]).unwrap_err();
    assert_eq!(
        err,
        scalepack::Error::UnknownDiscriminant { ty: "DomainAtom".into(), discriminant: 0 },
    );
}

#[test]
fn test_predicate_depth_limit() {
    let mut bytes = vec![1u8; 200];
    bytes.extend([2, 0]);
    let err = scalepack::decode_all::<CompoundPredicate<DomainPredicate>>(&bytes).unwrap_err();
    assert_eq!(err, scalepack::Error::RecursionLimit);
}

// ==== BUILDER ====

#[test]
fn test_builder_defaults() {
    let descriptor = QueryBuilder::new(FindDomains).build();
    let mut expected = vec![0, 2, 0, 4, 0];
    expected.push(0);
    expected.extend([0; 8]);
    expected.extend([0, 0]);
    assert_eq!(descriptor.query().encode(), expected);
    assert_eq!(descriptor.query().params, QueryParams::default());
}

#[test]
fn test_builder_params() -> R<()> {
    let descriptor = QueryBuilder::new(FindDomains)
        .offset(5)
        .limit(nz(10))
        .fetch_size(nz(3))
        .sort_by_metadata_key(Name::new("rank")?)
        .build();
    let params = &descriptor.query().params;
    assert_eq!(params.pagination, Pagination { limit: Some(nz(10)), offset: 5 });
    assert_eq!(params.sorting.sort_by_metadata_key, Some(Name::new("rank")?));
    assert_eq!(params.fetch_size, Some(nz(3)));
    Ok(())
}

#[test]
fn test_builder_filter_replaces() -> R<()> {
    let first = CompoundPredicate::atom(DomainPredicate::id_equals("a".parse()?));
    let second = CompoundPredicate::atom(DomainPredicate::Metadata(MetadataPredicate::key_equals(
        Name::new("tier")?,
        Json::from(serde_json::json!("gold")),
    )));
    let descriptor = QueryBuilder::new(FindDomains).filter(first).filter(second.clone()).build();
    let QueryBox::FindDomains(query) = &descriptor.query().query else {
        panic!("wrong query kind: {}", descriptor.query().query.tag());
    };
    assert_eq!(query.predicate, second);
    Ok(())
}

#[test]
fn test_builder_fetch_size_or() {
    let kept = QueryBuilder::new(FindDomains).fetch_size(nz(2)).fetch_size_or(Some(nz(9))).build();
    assert_eq!(kept.query().params.fetch_size, Some(nz(2)));
    let filled = QueryBuilder::new(FindDomains).fetch_size_or(Some(nz(9))).build();
    assert_eq!(filled.query().params.fetch_size, Some(nz(9)));
}

#[test]
fn test_builder_select_decodes_projection() -> R<()> {
    let alice = account(1, "wonderland")?;
    let descriptor =
        QueryBuilder::new(FindAccounts).select::<AccountId>(AccountSelector::id()).build();
    let QueryBox::FindAccounts(query) = &descriptor.query().query else {
        panic!("wrong query kind");
    };
    assert_eq!(query.selector, vec![AccountSelector::id()]);
    assert_eq!(query.selector.encode(), vec![4, 1, 0]);

    let items = descriptor.decode(vec![QueryOutputBatchBox::AccountId(vec![alice.clone()])])?;
    assert_eq!(items, vec![alice]);
    Ok(())
}

#[test]
fn test_builder_select_tuple() -> R<()> {
    let alice = account(1, "wonderland")?;
    let bob = account(2, "wonderland")?;
    let descriptor = QueryBuilder::new(FindAccounts)
        .select_tuple::<(AccountId, Metadata)>(vec![
            AccountSelector::id(),
            AccountSelector::Metadata(MetadataSelector::Atom),
        ])
        .build();
    let items = descriptor.decode(vec![
        QueryOutputBatchBox::AccountId(vec![alice.clone(), bob.clone()]),
        QueryOutputBatchBox::Metadata(vec![Metadata::new(), Metadata::new()]),
    ])?;
    assert_eq!(items, vec![(alice, Metadata::new()), (bob, Metadata::new())]);
    Ok(())
}

// ==== OUTPUT ====

#[test]
fn test_output_shape_mismatch() -> R<()> {
    let alice = account(1, "wonderland")?;
    let batches = vec![QueryOutputBatchBox::AccountId(vec![alice.clone()])];
    let wrong_kind = <Domain as Selected>::from_batches(batches);
    assert!(matches!(wrong_kind, Err(Error::OutputShape(_))));

    let wrong_width = <Domain as Selected>::from_batches(Vec::new());
    assert!(matches!(wrong_width, Err(Error::OutputShape(_))));

    let unequal = <(AccountId, Metadata)>::from_batches(vec![
        QueryOutputBatchBox::AccountId(vec![alice]),
        QueryOutputBatchBox::Metadata(Vec::new()),
    ]);
    assert!(matches!(unequal, Err(Error::OutputShape(_))));
    Ok(())
}

#[test]
fn test_output_items_and_cursor() -> R<()> {
    let alice = account(1, "wonderland")?;
    let output = QueryOutput {
        batch: vec![QueryOutputBatchBox::Domain(vec![domain("a", &alice)?, domain("b", &alice)?])],
        remaining_items: 3,
        continue_cursor: Some(ForwardCursor::new("q1", nz(2))),
    };
    assert_eq!(output.items(), 2);
    let decoded = scalepack::decode_all::<QueryOutput>(&output.encode())?;
    assert_eq!(decoded, output);
    let cursor = decoded.continue_cursor.as_ref().map(ForwardCursor::cursor);
    assert_eq!(cursor, Some(nz(2)));
    Ok(())
}

#[test]
fn test_cursor_encoding() {
    let cursor = ForwardCursor::new("q1", nz(2));
    assert_eq!(cursor.encode(), vec![8, b'q', b'1', 2, 0, 0, 0, 0, 0, 0, 0]);
    assert_eq!(
        scalepack::decode_all::<ForwardCursor>(&[8, b'q', b'1', 0, 0, 0, 0, 0, 0, 0, 0]),
        Err(scalepack::Error::ZeroNonZero),
    );
}

#[test]
fn test_batch_discriminants_keep_ledger_gaps() {
    let upper: Vec<(u8, &str)> =
        QueryOutputBatchBox::VARIANTS.iter().copied().filter(|&(d, _)| d > 15).collect();
    assert_eq!(upper, vec![(17, "Permission"), (22, "PeerId"), (23, "RoleId"), (24, "TriggerId")]);
    assert_eq!(QueryOutputBatchBox::Permission(Vec::new()).encode(), vec![17, 0]);
    assert_eq!(QueryOutputBatchBox::TriggerId(Vec::new()).encode(), vec![24, 0]);
    for unassigned in [16, 18, 21, 25] {
        assert!(scalepack::decode_all::<QueryOutputBatchBox>(&[unassigned, 0]).is_err());
    }
}

// ==== FRAMES ====

#[test]
fn test_sign_covers_encoded_payload() -> R<()> {
    let request = QueryRequestWithAuthority::new(
        account(1, "wonderland")?,
        QueryRequest::Continue(ForwardCursor::new("q1", nz(2))),
    );
    let payload = request.encode();
    let expected_payload = payload.clone();
    let signed = request.clone().sign_with(
        move |bytes: &[u8]| {
            assert_eq!(bytes, expected_payload.as_slice());
            Hash::new([7; 32])
        },
        |digest: &[u8]| Ok::<_, Error>(Signature::new(digest.to_vec())),
    )?;
    assert_eq!(signed.payload(), &request);

    let mut expected = vec![1, 32 << 2];
    expected.extend([7; 32]);
    expected.extend(payload);
    assert_eq!(signed.encode(), expected);
    assert_eq!(scalepack::decode_all::<SignedQuery>(&expected)?, signed);
    Ok(())
}

#[test]
fn test_request_discriminants() -> R<()> {
    let start = QueryRequest::Start(QueryBuilder::new(FindDomains).build().query().clone());
    let resume = QueryRequest::Continue(ForwardCursor::new("q", nz(1)));
    let singular = QueryRequest::Singular(FindAssetQuantityById {
        id: AssetId::new("rose#wonderland".parse()?, account(1, "wonderland")?),
    }
    .into_box());
    assert_eq!(singular.encode()[0], 0);
    assert_eq!(start.encode()[0], 1);
    assert_eq!(resume.encode()[0], 2);
    Ok(())
}

#[test]
fn test_singular_extract() -> R<()> {
    let numeric = SingularQueryOutputBox::Numeric(Numeric::from(5u32));
    let json = SingularQueryOutputBox::Json(Json::from(serde_json::json!({"a": 1})));
    assert_eq!(FindAssetQuantityById::extract(numeric.clone()), Some(Numeric::from(5u32)));
    assert_eq!(FindAssetQuantityById::extract(json.clone()), None);
    assert!(FindDomainMetadata::extract(json).is_some());
    assert_eq!(FindDomainMetadata::extract(numeric), None);

    let query = FindDomainMetadata { id: "wonderland".parse()?, key: Name::new("tier")? };
    assert_eq!(query.into_box().encode()[0], 3);
    Ok(())
}

#[test]
fn test_response_decode() -> R<()> {
    let response = QueryResponse::Singular(SingularQueryOutputBox::Json("true".parse()?));
    let bytes = response.encode();
    assert_eq!(bytes, vec![0, 2, 4 << 2, b't', b'r', b'u', b'e']);
    assert_eq!(scalepack::decode_all::<QueryResponse>(&bytes)?, response);
    assert!(scalepack::decode_all::<QueryResponse>(&[2]).is_err());
    Ok(())
}

// ==== FAILURES ====

#[test]
fn test_validation_fail_bytes() -> R<()> {
    let fail = ValidationFail::QueryFailed(QueryExecutionFail::CursorDone);
    assert_eq!(fail.encode(), vec![2, 4]);
    assert_eq!(scalepack::decode_all::<ValidationFail>(&[2, 4])?, fail);
    assert_eq!(ValidationFail::TooComplex.encode(), vec![3]);
    assert!(matches!(
        scalepack::decode_all::<ValidationFail>(&[1]),
        Err(scalepack::Error::UnknownDiscriminant { discriminant: 1, .. }),
    ));
    Ok(())
}

#[test]
fn test_find_error_display() -> R<()> {
    let missing = FindError::Domain("garden".parse()?);
    let fail = ValidationFail::QueryFailed(QueryExecutionFail::Find(missing));
    assert_eq!(fail.to_string(), "query failed: domain `garden` not found");
    Ok(())
}

// ==== SCHEMA ====

fn cross_check<T>(registry: &Registry, ty: &str, value: &T) -> R<Value>
where
    T: Encode + Decode + PartialEq + Debug,
{
    let bytes = value.encode();
    let codec = registry.resolve(ty)?;
    let dynamic = codec.decode_all(&bytes)?;
    assert_eq!(codec.encode(&dynamic)?, bytes, "{}", ty);
    assert_eq!(&scalepack::decode_all::<T>(&bytes)?, value, "{}", ty);
    Ok(dynamic)
}

#[test]
fn test_schema_envelopes() -> R<()> {
    let registry = schema::registry()?;
    let alice = account(1, "wonderland")?;

    let page = Pagination { limit: Some(nz(10)), offset: 3 };
    let dynamic = cross_check(&registry, "Pagination", &page)?;
    assert_eq!(
        dynamic,
        Value::record([("limit", Value::some(Value::UInt(10))), ("offset", Value::UInt(3))]),
    );

    let descriptor = QueryBuilder::new(FindDomains).limit(nz(1)).build();
    cross_check(&registry, "QueryParams", &descriptor.query().params)?;
    cross_check(
        &registry,
        "QueryOutput",
        &QueryOutput {
            batch: vec![
                QueryOutputBatchBox::Domain(vec![domain("a", &alice)?]),
                QueryOutputBatchBox::Permission(vec![Permission {
                    name: "CanRead".to_owned(),
                    payload: "null".parse()?,
                }]),
            ],
            remaining_items: 0,
            continue_cursor: Some(ForwardCursor::new("q", nz(4))),
        },
    )?;
    cross_check(&registry, "Hash", &Hash::new([3; 32]))?;
    cross_check(
        &registry,
        "QueryResponse",
        &QueryResponse::Singular(SingularQueryOutputBox::Numeric(Numeric::new(1250, 2))),
    )?;
    Ok(())
}

#[test]
fn test_schema_failures() -> R<()> {
    let registry = schema::registry()?;
    let missing = FindError::Account(account(1, "wonderland")?);
    let fail = ValidationFail::QueryFailed(QueryExecutionFail::Find(missing));
    let dynamic = cross_check(&registry, "ValidationFail", &fail)?;
    assert_eq!(dynamic.variant_tag(), Some("QueryFailed"));
    cross_check(&registry, "ValidationFail", &ValidationFail::NotPermitted("no".to_owned()))?;
    Ok(())
}

#[test]
fn test_schema_compound_predicate() -> R<()> {
    let registry = schema::registry()?;
    let predicate = CompoundPredicate::atom(DomainPredicate::Id(DomainIdPredicate::Name(
        NamePredicate::ends_with("land"),
    )))
    .or(CompoundPredicate::atom(DomainPredicate::id_equals("garden".parse()?)).not());
    cross_check(&registry, "CompoundPredicate<DomainPredicate>", &predicate)?;

    let first = registry.resolve("CompoundPredicate<DomainPredicate>")?;
    let second = registry.resolve("CompoundPredicate< DomainPredicate >")?;
    assert!(scalepack::Codec::ptr_eq(&first, &second));
    Ok(())
}

#[test]
fn test_schema_refinements() -> R<()> {
    let registry = schema::registry()?;
    let name = registry.resolve("Name")?;
    assert!(matches!(name.encode(&Value::str("a b")), Err(scalepack::Error::InvalidValue(_))));
    assert!(matches!(
        name.decode_all(&"a@b".to_owned().encode()),
        Err(scalepack::Error::InvalidValue(_)),
    ));
    let json = registry.resolve("Json")?;
    assert!(json.encode(&Value::str("{")).is_err());
    assert!(json.encode(&Value::str("[1, 2]")).is_ok());
    Ok(())
}

proptest! {
    #[test]
    fn prop_pagination_matches_schema(
        limit in proptest::option::of(1u64..),
        offset in any::<u64>(),
    ) {
        let registry = schema::registry().expect("schema builds");
        let page = Pagination { limit: limit.and_then(NonZeroU64::new), offset };
        let bytes = page.encode();
        let codec = registry.resolve("Pagination").expect("registered");
        let dynamic = codec.decode_all(&bytes).expect("decodes");
        prop_assert_eq!(codec.encode(&dynamic).expect("encodes"), bytes);
    }

    #[test]
    fn prop_numeric_text(mantissa in any::<u64>(), scale in 0u32..12) {
        let numeric = Numeric::new(u128::from(mantissa), scale);
        let parsed: Numeric = numeric.to_string().parse().expect("parses");
        prop_assert_eq!(parsed, numeric);
    }
}

#[test]
fn test_schema_batch_gaps_match_typed() -> R<()> {
    let registry = schema::registry()?;
    let codec = registry.resolve("QueryOutputBatchBox")?;
    assert_eq!(codec.decode_all(&[22, 0])?.variant_tag(), Some("PeerId"));
    assert!(codec.decode_all(&[18, 0]).is_err());
    Ok(())
}

#[test]
fn test_schema_ordered_collections_match_typed() -> R<()> {
    let registry = schema::registry()?;

    let algorithms: BTreeSet<Algorithm> =
        [Algorithm::BlsNormal, Algorithm::Ed25519].into_iter().collect();
    assert_eq!(algorithms.encode(), vec![2 << 2, 0, 2]);
    cross_check(&registry, "BTreeSet<Algorithm>", &algorithms)?;

    let mut signers = BTreeMap::new();
    signers.insert(PublicKey::new(Algorithm::BlsNormal, vec![1]), 2u32);
    signers.insert(PublicKey::new(Algorithm::Secp256k1, vec![9]), 1u32);
    cross_check(&registry, "BTreeMap<PublicKey, u32>", &signers)?;

    let codec = registry.resolve("BTreeSet<Algorithm>")?;
    assert_eq!(
        codec.decode_all(&[2 << 2, 2, 0]),
        Err(scalepack::Error::UnorderedEntry)
    );
    Ok(())
}
