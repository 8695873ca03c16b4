//! Customer and product resolution used while building invoices and quotations.
//!
//! Resolution is read-then-maybe-write. Two identical requests racing each
//! other can both miss and both insert; duplicates are tolerated.

use service_core::error::AppError;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::dtos::CustomerRef;
use crate::models::{Customer, CustomerMatch, LineItemInput, PartySnapshot, Product};
use crate::store::{CustomerStore, ProductStore};

/// Buyer snapshot and, when one was found or created, the linked customer.
#[derive(Debug, Clone, Default)]
pub struct ResolvedCustomer {
    pub customer_id: Option<Uuid>,
    pub snapshot: PartySnapshot,
}

fn with_state_code(mut snapshot: PartySnapshot) -> PartySnapshot {
    snapshot.state_code = snapshot.effective_state_code();
    snapshot
}

/// Catalog form of inline details: GSTIN upper-cased, email lower-cased, fields trimmed.
fn normalized(details: &PartySnapshot) -> PartySnapshot {
    let clean = |v: &Option<String>| {
        v.as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };
    with_state_code(PartySnapshot {
        name: clean(&details.name),
        gstin: clean(&details.gstin).map(|g| g.to_uppercase()),
        state_code: clean(&details.state_code),
        state: clean(&details.state),
        address: clean(&details.address),
        city: clean(&details.city),
        pincode: clean(&details.pincode),
        phone: clean(&details.phone),
        email: clean(&details.email).map(|e| e.to_lowercase()),
    })
}

/// Resolve a customer reference within the tenant.
///
/// An id must exist. Inline details are matched by id, then GSTIN, email and
/// phone; a named but unmatched customer is created. Inline fields override
/// the stored record in the returned snapshot.
#[instrument(skip(store, customer))]
pub async fn resolve_customer<S>(
    store: &S,
    company_id: &str,
    customer: &CustomerRef,
) -> Result<ResolvedCustomer, AppError>
where
    S: CustomerStore + ?Sized,
{
    let input = match customer {
        CustomerRef::Unresolved => return Ok(ResolvedCustomer::default()),
        CustomerRef::ById(id) => {
            let found = store
                .get_customer(company_id, *id)
                .await?
                .ok_or_else(|| AppError::not_found("Customer not found"))?;
            return Ok(ResolvedCustomer {
                customer_id: Some(found.id),
                snapshot: found.snapshot(),
            });
        }
        CustomerRef::Inline(input) => input,
    };

    let details = normalized(&input.details);

    let mut existing = None;
    if let Some(id) = input.parsed_id() {
        existing = store.get_customer(company_id, id).await?;
    }
    if existing.is_none() {
        let contact = CustomerMatch::from_snapshot(&details);
        if !contact.is_empty() {
            existing = store.find_customer_by_contact(company_id, &contact).await?;
        }
    }

    if let Some(found) = existing {
        debug!(customer_id = %found.id, "Matched existing customer");
        return Ok(ResolvedCustomer {
            customer_id: Some(found.id),
            snapshot: with_state_code(details.merged_over(&found.snapshot())),
        });
    }

    if details.name.is_none() {
        return Ok(ResolvedCustomer {
            customer_id: None,
            snapshot: details,
        });
    }

    let created = store
        .insert_customer(Customer::new(company_id, details.clone()))
        .await?;
    info!(customer_id = %created.id, "Customer created from document");
    Ok(ResolvedCustomer {
        customer_id: Some(created.id),
        snapshot: details,
    })
}

/// Find or create the catalog product for a line and back-fill its missing fields.
///
/// Returns `None` only for a line without a usable name.
#[instrument(skip(store, line), fields(name = %line.name))]
pub async fn resolve_product<S>(
    store: &S,
    company_id: &str,
    line: &LineItemInput,
) -> Result<Option<Uuid>, AppError>
where
    S: ProductStore + ?Sized,
{
    let name = line.name.trim();
    let hsn = line.hsn.trim();

    let mut existing = None;
    if let Some(id) = line.product_id {
        existing = store.get_product(company_id, id).await?;
    }
    if existing.is_none() && !name.is_empty() {
        existing = store.find_product(company_id, name, hsn).await?;
    }

    if let Some(product) = existing {
        let backfill = product.backfill_from(hsn, line.unit.as_deref(), line.rate, line.gst_rate);
        if !backfill.is_empty() {
            store
                .backfill_product(company_id, product.id, &backfill)
                .await?;
            debug!(product_id = %product.id, "Product back-filled from line");
        }
        return Ok(Some(product.id));
    }

    if name.is_empty() {
        return Ok(None);
    }

    let mut product = Product::new(company_id, name, hsn);
    product.unit = line
        .unit
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .map(str::to_string);
    product.purchase_price = Some(line.rate);
    product.sell_price = Some(line.rate);
    product.gst_rate = Some(line.gst_rate);

    let created = store.insert_product(product).await?;
    info!(product_id = %created.id, "Product created from line item");
    Ok(Some(created.id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dtos::CustomerInput;
    use crate::store::MemoryStore;
    use rust_decimal_macros::dec;

    fn inline(details: PartySnapshot) -> CustomerRef {
        CustomerRef::Inline(CustomerInput { id: None, details })
    }

    #[tokio::test]
    async fn named_inline_customer_is_created_once_matched_after() {
        let store = MemoryStore::new();
        let details = PartySnapshot {
            name: Some("Acme Traders".to_string()),
            gstin: Some("27aapfu0939f1zv".to_string()),
            ..Default::default()
        };

        let first = resolve_customer(&store, "co1", &inline(details.clone()))
            .await
            .unwrap();
        let created = first.customer_id.unwrap();
        assert_eq!(first.snapshot.gstin.as_deref(), Some("27AAPFU0939F1ZV"));
        assert_eq!(first.snapshot.state_code.as_deref(), Some("27"));

        let second = resolve_customer(&store, "co1", &inline(details)).await.unwrap();
        assert_eq!(second.customer_id, Some(created));
    }

    #[tokio::test]
    async fn unnamed_inline_customer_is_snapshot_only() {
        let store = MemoryStore::new();
        let resolved = resolve_customer(
            &store,
            "co1",
            &inline(PartySnapshot {
                city: Some("Pune".to_string()),
                ..Default::default()
            }),
        )
        .await
        .unwrap();
        assert_eq!(resolved.customer_id, None);
        assert_eq!(resolved.snapshot.city.as_deref(), Some("Pune"));
    }

    #[tokio::test]
    async fn unknown_customer_id_is_not_found() {
        let store = MemoryStore::new();
        let err = resolve_customer(&store, "co1", &CustomerRef::ById(Uuid::new_v4()))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn product_is_reused_by_name_and_hsn() {
        let store = MemoryStore::new();
        let line = LineItemInput {
            name: "Steel Rod".to_string(),
            hsn: "7214".to_string(),
            quantity: dec!(2),
            rate: dec!(500),
            gst_rate: dec!(18),
            ..Default::default()
        };

        let first = resolve_product(&store, "co1", &line).await.unwrap().unwrap();
        let again = resolve_product(&store, "co1", &line).await.unwrap().unwrap();
        assert_eq!(first, again);

        let product = store.get_product("co1", first).await.unwrap().unwrap();
        assert_eq!(product.sell_price, Some(dec!(500)));
        assert_eq!(product.purchase_price, Some(dec!(500)));
        assert_eq!(product.gst_rate, Some(dec!(18)));

        let other_tenant = resolve_product(&store, "co2", &line).await.unwrap().unwrap();
        assert_ne!(other_tenant, first);
    }
}
