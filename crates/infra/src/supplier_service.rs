//! Supplier records: owned by their creator, global when an admin creates them.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use stockroom_auth::{Principal, ensure_owner_or_admin};
use stockroom_catalog::{Supplier, SupplierContact, SupplierPatch};
use stockroom_core::{DomainError, Entity, SupplierId, UserId};

use crate::error::ServiceResult;
use crate::store::{InventoryStore, StoreTx};

pub struct SupplierService<S> {
    store: Arc<S>,
}

impl<S> Clone for SupplierService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: InventoryStore> SupplierService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn create_supplier(
        &self,
        principal: &Principal,
        name: &str,
        contact: SupplierContact,
    ) -> ServiceResult<Supplier> {
        let owner = (!principal.is_admin()).then_some(principal.id);
        let supplier = Supplier::new(owner, name, contact, Utc::now())?;

        self.store.transaction(|tx| -> ServiceResult<()> {
            ensure_name_free(tx, owner, supplier.name(), None)?;
            tx.put_supplier(supplier.clone())?;
            Ok(())
        })?;

        info!(supplier = %supplier.id(), global = owner.is_none(), "supplier created");
        Ok(supplier)
    }

    pub fn update_supplier(
        &self,
        principal: &Principal,
        id: SupplierId,
        patch: SupplierPatch,
    ) -> ServiceResult<Supplier> {
        self.store.transaction(|tx| -> ServiceResult<Supplier> {
            let mut supplier = load_supplier(tx, id)?;
            ensure_owner_or_admin(principal, supplier.owner(), "supplier")?;
            supplier.apply_patch(patch)?;
            ensure_name_free(tx, supplier.owner(), supplier.name(), Some(id))?;
            tx.put_supplier(supplier.clone())?;
            Ok(supplier)
        })
    }

    /// Refused while a product references the supplier.
    pub fn delete_supplier(&self, principal: &Principal, id: SupplierId) -> ServiceResult<()> {
        self.store.transaction(|tx| -> ServiceResult<()> {
            let supplier = load_supplier(tx, id)?;
            ensure_owner_or_admin(principal, supplier.owner(), "supplier")?;
            if tx.products()?.iter().any(|p| p.supplier_id() == Some(id)) {
                return Err(DomainError::conflict(format!(
                    "supplier '{}' is referenced by products",
                    supplier.name()
                ))
                .into());
            }
            tx.remove_supplier(id)?;
            Ok(())
        })?;
        info!(supplier = %id, "supplier deleted");
        Ok(())
    }

    /// Admins see every supplier; clients see their own and the global ones.
    pub fn list_suppliers(&self, principal: &Principal) -> ServiceResult<Vec<Supplier>> {
        self.store.read(|tx| -> ServiceResult<Vec<Supplier>> {
            let mut suppliers: Vec<Supplier> = tx
                .suppliers()?
                .into_iter()
                .filter(|s| principal.is_admin() || s.is_visible_to(principal.id))
                .collect();
            suppliers.sort_by_key(Supplier::name_key);
            Ok(suppliers)
        })
    }
}

fn load_supplier(tx: &dyn StoreTx, id: SupplierId) -> ServiceResult<Supplier> {
    Ok(tx
        .supplier(id)?
        .ok_or_else(|| DomainError::not_found(format!("supplier {id}")))?)
}

fn ensure_name_free(
    tx: &dyn StoreTx,
    owner: Option<UserId>,
    name: &str,
    except: Option<SupplierId>,
) -> ServiceResult<()> {
    let taken = tx
        .suppliers()?
        .iter()
        .any(|s| Some(s.id()) != except && s.conflicts_with(owner, name));
    if taken {
        return Err(DomainError::conflict(format!("supplier '{}' already exists", name.trim())).into());
    }
    Ok(())
}
