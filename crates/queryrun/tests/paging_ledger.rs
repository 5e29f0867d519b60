//! End-to-end query runs against an in-memory ledger that keeps live cursors.

use std::collections::HashMap;
use std::num::NonZeroU64;
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use anyhow::Result;
use querywire::AccountId;
use querywire::CompoundPredicate;
use querywire::DomainId;
use querywire::ForwardCursor;
use querywire::QueryBox;
use querywire::QueryOutput;
use querywire::QueryOutputBatchBox;
use querywire::QueryRequest;
use querywire::QueryResponse;
use querywire::QueryWithParams;
use querywire::SignedQuery;
use querywire::entity::Domain;
use querywire::failure::QueryExecutionFail;
use querywire::failure::ValidationFail;
use querywire::ids::Algorithm;
use querywire::ids::PublicKey;
use querywire::predicate::DomainIdAtom;
use querywire::predicate::DomainIdPredicate;
use querywire::predicate::DomainPredicate;
use querywire::predicate::MetadataPredicate;
use querywire::predicate::NamePredicate;
use querywire::predicate::StringAtom;
use querywire::query::FindDomains;
use querywire::query::FindRoles;
use querywire::selector::DomainIdSelector;
use querywire::selector::DomainSelector;
use querywire::value::Metadata;
use queryrun::Client;
use queryrun::ClientConfig;
use queryrun::Error;
use queryrun::Hasher;
use queryrun::Response;
use queryrun::Sha256Hasher;
use queryrun::Transport;
use queryrun::mock_transport::EchoSigner;
use scalepack::Encode;
use tokio::sync::Mutex;

const DEFAULT_FETCH: usize = 10;
const MAX_FETCH: u64 = 100;

/// A refused request: the HTTP status and the failure in its body.
type Rejection = (u16, ValidationFail);

fn failed(status: u16, fail: QueryExecutionFail) -> Rejection {
    (status, ValidationFail::QueryFailed(fail))
}

struct LiveQuery {
    items: Vec<Domain>,
    selectors: Vec<DomainSelector>,
    position: usize,
    fetch_size: usize,
}

/// Serves `FindDomains` from a fixed list, paging with server-side cursors.
struct PagingLedger {
    domains: Vec<Domain>,
    live: Mutex<HashMap<String, LiveQuery>>,
    next_id: AtomicUsize,
    requests: AtomicUsize,
}

impl PagingLedger {
    fn new(domains: Vec<Domain>) -> Self {
        Self {
            domains,
            live: Mutex::new(HashMap::new()),
            next_id: AtomicUsize::new(0),
            requests: AtomicUsize::new(0),
        }
    }

    fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    async fn live_queries(&self) -> usize {
        self.live.lock().await.len()
    }

    async fn handle(&self, body: &[u8]) -> std::result::Result<QueryOutput, Rejection> {
        let conversion =
            |e: scalepack::Error| failed(400, QueryExecutionFail::Conversion(e.to_string()));
        let SignedQuery::V1(signed) =
            scalepack::decode_all::<SignedQuery>(body).map_err(conversion)?;
        let digest = Sha256Hasher.hash(&signed.payload.encode());
        if signed.signature.as_bytes() != digest.as_bytes() {
            return Err((401, ValidationFail::NotPermitted("bad signature".to_owned())));
        }

        match signed.payload.request {
            QueryRequest::Start(QueryWithParams {
                query: QueryBox::FindDomains(query),
                params,
            }) => {
                let fetch_size =
                    params.fetch_size.map_or(DEFAULT_FETCH as u64, NonZeroU64::get);
                if fetch_size > MAX_FETCH {
                    return Err(failed(400, QueryExecutionFail::FetchSizeTooBig));
                }
                let mut items = Vec::new();
                for domain in &self.domains {
                    if matches(domain, &query.predicate)? {
                        items.push(domain.clone());
                    }
                }
                let limit = params.pagination.limit.map_or(usize::MAX, |l| l.get() as usize);
                let offset = params.pagination.offset as usize;
                let items = items.into_iter().skip(offset).take(limit).collect();

                let id = format!("q{}", self.next_id.fetch_add(1, Ordering::SeqCst));
                let mut live = LiveQuery {
                    items,
                    selectors: query.selector,
                    position: 0,
                    fetch_size: fetch_size as usize,
                };
                let output = serve(&id, &mut live)?;
                if output.continue_cursor.is_some() {
                    self.live.lock().await.insert(id, live);
                }
                Ok(output)
            }
            QueryRequest::Start(_) => {
                Err((400, ValidationFail::NotPermitted("unsupported query".to_owned())))
            }
            QueryRequest::Continue(cursor) => {
                let mut live = self.live.lock().await;
                let Some(query) = live.get_mut(cursor.query()) else {
                    return Err(failed(404, QueryExecutionFail::NotFound));
                };
                if cursor.cursor().get() as usize != query.position {
                    return Err(failed(400, QueryExecutionFail::CursorMismatch));
                }
                let output = serve(cursor.query(), query)?;
                if output.continue_cursor.is_none() {
                    live.remove(cursor.query());
                }
                Ok(output)
            }
            QueryRequest::Singular(_) => {
                Err(failed(400, QueryExecutionFail::InvalidSingularParameters))
            }
        }
    }
}

#[async_trait::async_trait]
impl Transport for PagingLedger {
    async fn submit(&self, body: &[u8]) -> queryrun::transport::Result<Response> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        Ok(match self.handle(body).await {
            Ok(output) => Response::ok(QueryResponse::Iterable(output).encode()),
            Err((status, fail)) => Response::new(status, fail.encode()),
        })
    }
}

fn serve(id: &str, live: &mut LiveQuery) -> std::result::Result<QueryOutput, Rejection> {
    let end = (live.position + live.fetch_size).min(live.items.len());
    let chunk = &live.items[live.position..end];
    live.position = end;

    let mut batch = Vec::with_capacity(live.selectors.len());
    for selector in &live.selectors {
        batch.push(match selector {
            DomainSelector::Atom => QueryOutputBatchBox::Domain(chunk.to_vec()),
            DomainSelector::Id(DomainIdSelector::Atom) => {
                QueryOutputBatchBox::DomainId(chunk.iter().map(|d| d.id.clone()).collect())
            }
            _ => return Err((400, ValidationFail::TooComplex)),
        });
    }

    let remaining = (live.items.len() - end) as u64;
    let continue_cursor = NonZeroU64::new(end as u64)
        .filter(|_| remaining > 0)
        .map(|position| ForwardCursor::new(id, position));
    Ok(QueryOutput { batch, remaining_items: remaining, continue_cursor })
}

fn matches(
    domain: &Domain,
    predicate: &CompoundPredicate<DomainPredicate>,
) -> std::result::Result<bool, Rejection> {
    match predicate {
        CompoundPredicate::Atom(DomainPredicate::Id(id)) => Ok(matches_id(domain, id)),
        CompoundPredicate::Atom(_) => Err((400, ValidationFail::TooComplex)),
        CompoundPredicate::Not(inner) => Ok(!matches(domain, inner)?),
        CompoundPredicate::And(all) => {
            for p in all {
                if !matches(domain, p)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        CompoundPredicate::Or(any) => {
            for p in any {
                if matches(domain, p)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
    }
}

fn matches_id(domain: &Domain, predicate: &DomainIdPredicate) -> bool {
    match predicate {
        DomainIdPredicate::Atom(DomainIdAtom::Equals(id)) => &domain.id == id,
        DomainIdPredicate::Name(NamePredicate::Atom(atom)) => {
            let name = domain.id.name().as_str();
            match atom {
                StringAtom::Equals(s) => name == s.as_str(),
                StringAtom::Contains(s) => name.contains(s.as_str()),
                StringAtom::StartsWith(s) => name.starts_with(s.as_str()),
                StringAtom::EndsWith(s) => name.ends_with(s.as_str()),
            }
        }
    }
}

fn nz(n: u64) -> NonZeroU64 {
    NonZeroU64::new(n).expect("non-zero literal")
}

fn alice() -> Result<AccountId> {
    let key = PublicKey::new(Algorithm::Ed25519, vec![7; 32]);
    Ok(AccountId::new(key, "wonderland".parse()?))
}

fn ledger(names: impl IntoIterator<Item = String>) -> Result<Arc<PagingLedger>> {
    let owner = alice()?;
    let mut domains = Vec::new();
    for name in names {
        domains.push(Domain {
            id: name.parse()?,
            logo: None,
            metadata: Metadata::new(),
            owned_by: owner.clone(),
        });
    }
    Ok(Arc::new(PagingLedger::new(domains)))
}

fn numbered(prefix: &str, count: usize) -> impl Iterator<Item = String> + '_ {
    (0..count).map(move |i| format!("{}{:02}", prefix, i))
}

fn by_name(name: NamePredicate) -> CompoundPredicate<DomainPredicate> {
    CompoundPredicate::atom(DomainPredicate::Id(DomainIdPredicate::Name(name)))
}

fn name_starts_with(prefix: &str) -> CompoundPredicate<DomainPredicate> {
    by_name(NamePredicate::starts_with(prefix))
}

#[tokio::test]
async fn pages_through_every_domain() -> Result<()> {
    let ledger = ledger(numbered("domain", 25))?;
    let client = Client::new(ledger.clone(), Arc::new(EchoSigner), alice()?);

    let descriptor = client.query(FindDomains).fetch_size(nz(10)).build();
    let domains = client.execute_all(descriptor).await?;
    let names: Vec<String> = domains.iter().map(|d| d.id.to_string()).collect();
    assert_eq!(names, numbered("domain", 25).collect::<Vec<_>>());
    assert_eq!(ledger.requests(), 3);
    assert_eq!(ledger.live_queries().await, 0);
    Ok(())
}

#[tokio::test]
async fn filters_and_windows_on_the_server() -> Result<()> {
    let ledger = ledger(numbered("alpha", 5).chain(numbered("beta", 6)))?;
    let client = Client::new(ledger.clone(), Arc::new(EchoSigner), alice()?);

    let descriptor = client
        .query(FindDomains)
        .filter(name_starts_with("beta"))
        .offset(1)
        .limit(nz(3))
        .fetch_size(nz(2))
        .build();
    let ids: Vec<DomainId> =
        client.execute_all(descriptor).await?.into_iter().map(|d| d.id).collect();
    let expected: Vec<DomainId> = ["beta01", "beta02", "beta03"]
        .iter()
        .map(|s| s.parse())
        .collect::<querywire::Result<_>>()?;
    assert_eq!(ids, expected);
    assert_eq!(ledger.requests(), 2);
    Ok(())
}

#[tokio::test]
async fn negated_and_combined_filters() -> Result<()> {
    let ledger = ledger(numbered("alpha", 3).chain(numbered("beta", 3)))?;
    let client = Client::new(ledger.clone(), Arc::new(EchoSigner), alice()?);

    let not_alpha = name_starts_with("alpha").not();
    let not_last = by_name(NamePredicate::ends_with("02")).not();
    let descriptor = client.query(FindDomains).filter(not_alpha.and(not_last)).build();
    let names: Vec<String> =
        client.execute_all(descriptor).await?.iter().map(|d| d.id.to_string()).collect();
    assert_eq!(names, ["beta00", "beta01"]);
    Ok(())
}

#[tokio::test]
async fn selects_ids_and_tuples() -> Result<()> {
    let ledger = ledger(numbered("domain", 5))?;
    let client = Client::new(ledger.clone(), Arc::new(EchoSigner), alice()?);

    let descriptor = client
        .query(FindDomains)
        .select::<DomainId>(DomainSelector::id())
        .fetch_size(nz(2))
        .build();
    let ids = client.execute_all(descriptor).await?;
    assert_eq!(ids.len(), 5);
    assert_eq!(ids[4].to_string(), "domain04");

    let descriptor = client
        .query(FindDomains)
        .select_tuple::<(DomainId, Domain)>(vec![DomainSelector::id(), DomainSelector::Atom])
        .build();
    let pairs = client.execute_all(descriptor).await?;
    assert_eq!(pairs.len(), 5);
    assert!(pairs.iter().all(|(id, domain)| id == &domain.id));
    Ok(())
}

#[tokio::test]
async fn selector_count_must_match_tuple_width() -> Result<()> {
    let ledger = ledger(numbered("domain", 2))?;
    let client = Client::new(ledger.clone(), Arc::new(EchoSigner), alice()?);

    let descriptor = client
        .query(FindDomains)
        .select_tuple::<(DomainId, Domain)>(vec![DomainSelector::id()])
        .build();
    let err = client.execute_all(descriptor).await.unwrap_err();
    assert!(matches!(err, Error::Codec(_)));
    Ok(())
}

#[tokio::test]
async fn rejections_are_validation_errors() -> Result<()> {
    let ledger = ledger(numbered("domain", 3))?;
    let client = Client::new(ledger.clone(), Arc::new(EchoSigner), alice()?);

    let red = MetadataPredicate::key_equals("color".parse()?, "\"red\"".parse()?);
    let by_metadata = CompoundPredicate::atom(DomainPredicate::Metadata(red));
    let descriptor = client.query(FindDomains).filter(by_metadata).build();
    let err = client.execute_all(descriptor).await.unwrap_err();
    assert_eq!(err.validation(), Some(&ValidationFail::TooComplex));

    let descriptor = client.query(FindDomains).fetch_size(nz(MAX_FETCH + 1)).build();
    let err = client.execute_all(descriptor).await.unwrap_err();
    let too_big = ValidationFail::QueryFailed(QueryExecutionFail::FetchSizeTooBig);
    assert_eq!(err.validation(), Some(&too_big));

    let err = client.execute_all(client.query(FindRoles).build()).await.unwrap_err();
    assert!(matches!(err.validation(), Some(ValidationFail::NotPermitted(_))));

    assert_eq!(ledger.requests(), 3);
    Ok(())
}

#[tokio::test]
async fn stale_cursors_are_refused() -> Result<()> {
    let ledger = ledger(numbered("domain", 6))?;
    let client = Client::new(ledger.clone(), Arc::new(EchoSigner), alice()?);

    let unknown = QueryRequest::Continue(ForwardCursor::new("missing", nz(1)));
    let err = client.send(unknown).await.unwrap_err();
    assert_eq!(err.validation(), Some(&ValidationFail::QueryFailed(QueryExecutionFail::NotFound)));

    // the first page leaves a live query behind
    let descriptor = client.query(FindDomains).fetch_size(nz(2)).build();
    let first = client.send(QueryRequest::Start(descriptor.query().clone())).await?;
    let QueryResponse::Iterable(output) = first else {
        panic!("iterable query answered with a singular response");
    };
    let cursor = output.continue_cursor.expect("more pages to come");
    assert_eq!(cursor.cursor(), nz(2));

    let skipped = QueryRequest::Continue(ForwardCursor::new(cursor.query(), nz(4)));
    let err = client.send(skipped).await.unwrap_err();
    let mismatch = ValidationFail::QueryFailed(QueryExecutionFail::CursorMismatch);
    assert_eq!(err.validation(), Some(&mismatch));

    let resumed = client.send(QueryRequest::Continue(cursor)).await?;
    assert!(matches!(resumed, QueryResponse::Iterable(_)));
    assert_eq!(ledger.live_queries().await, 1);
    Ok(())
}

#[tokio::test]
async fn single_lookup_with_configured_fetch_size() -> Result<()> {
    let ledger = ledger(numbered("domain", 30))?;
    let text = format!("authority = \"{}\"\ndefault_fetch_size = 7\n", alice()?);
    let config = ClientConfig::from_toml_str(&text)?;
    let client = Client::from_config(&config, ledger.clone(), Arc::new(EchoSigner));

    let all = client.execute_all(client.query(FindDomains).build()).await?;
    assert_eq!(all.len(), 30);
    assert_eq!(ledger.requests(), 5);

    let target: DomainId = "domain17".parse()?;
    let filter = CompoundPredicate::atom(DomainPredicate::id_equals(target.clone()));
    let found = client.execute_single(client.query(FindDomains).filter(filter).build()).await?;
    assert_eq!(found.id, target);

    let missing = CompoundPredicate::atom(DomainPredicate::id_equals("nowhere".parse()?));
    let descriptor = client.query(FindDomains).filter(missing).build();
    assert_eq!(client.execute_single_opt(descriptor).await?, None);
    Ok(())
}
