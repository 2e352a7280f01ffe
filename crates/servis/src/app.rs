//! Application context
//!
//! Owns the remote handle, the three record tables, the current selections,
//! the service form and the settings store. Frontends translate user actions
//! into calls on `AppContext` and feed remote change batches into it.

use std::sync::Arc;

use chrono::{Local, NaiveDateTime};
use servis_api::{ApiError, ChangeBatch, DocumentId, RecordKind, RemoteCollections};
use tracing::{debug, info, warn};

use crate::confirm::{ConfirmRequest, Confirmer};
use crate::core::{ChangeFeed, EditOutcome, RecordTable, TableSync};
use crate::entry::{EntryForm, ServiceForm};
use crate::error::{Result, ServisError};
use crate::presentation::{VehicleDetails, apply_reference_filter, apply_text_filter};
use crate::settings::SettingsStore;

/// One synchronized table per record kind
#[derive(Debug, Clone)]
pub struct Tables {
    customers: TableSync,
    vehicles: TableSync,
    services: TableSync,
}

impl Default for Tables {
    fn default() -> Self {
        Self {
            customers: TableSync::new(RecordKind::Customers),
            vehicles: TableSync::new(RecordKind::Vehicles),
            services: TableSync::new(RecordKind::Services),
        }
    }
}

impl Tables {
    pub fn get(&self, kind: RecordKind) -> &TableSync {
        match kind {
            RecordKind::Customers => &self.customers,
            RecordKind::Vehicles => &self.vehicles,
            RecordKind::Services => &self.services,
        }
    }

    pub fn get_mut(&mut self, kind: RecordKind) -> &mut TableSync {
        match kind {
            RecordKind::Customers => &mut self.customers,
            RecordKind::Vehicles => &mut self.vehicles,
            RecordKind::Services => &mut self.services,
        }
    }
}

/// Selected document of each table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub customer: Option<DocumentId>,
    pub vehicle: Option<DocumentId>,
    pub service: Option<DocumentId>,
}

impl Selection {
    pub fn get(&self, kind: RecordKind) -> Option<&str> {
        match kind {
            RecordKind::Customers => self.customer.as_deref(),
            RecordKind::Vehicles => self.vehicle.as_deref(),
            RecordKind::Services => self.service.as_deref(),
        }
    }

    fn slot(&mut self, kind: RecordKind) -> &mut Option<DocumentId> {
        match kind {
            RecordKind::Customers => &mut self.customer,
            RecordKind::Vehicles => &mut self.vehicle,
            RecordKind::Services => &mut self.service,
        }
    }
}

pub struct AppContext {
    remote: Arc<dyn RemoteCollections>,
    tables: Tables,
    selection: Selection,
    vehicle_details: Option<VehicleDetails>,
    service_form: ServiceForm,
    customer_filter: String,
    settings: SettingsStore,
}

fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

impl AppContext {
    pub fn new(remote: Arc<dyn RemoteCollections>, settings: SettingsStore) -> Self {
        Self {
            remote,
            tables: Tables::default(),
            selection: Selection::default(),
            vehicle_details: None,
            service_form: ServiceForm::new(now()),
            customer_filter: String::new(),
            settings,
        }
    }

    pub fn remote(&self) -> &Arc<dyn RemoteCollections> {
        &self.remote
    }

    pub fn tables(&self) -> &Tables {
        &self.tables
    }

    pub fn table(&self, kind: RecordKind) -> &RecordTable {
        self.tables.get(kind).table()
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn vehicle_details(&self) -> Option<&VehicleDetails> {
        self.vehicle_details.as_ref()
    }

    pub fn service_form(&self) -> &ServiceForm {
        &self.service_form
    }

    pub fn service_form_mut(&mut self) -> &mut ServiceForm {
        &mut self.service_form
    }

    pub fn customer_filter(&self) -> &str {
        &self.customer_filter
    }

    pub fn settings(&self) -> &SettingsStore {
        &self.settings
    }

    /// Subscribe to every collection; the first batch of each is its snapshot
    pub async fn subscribe(&self) -> Result<ChangeFeed> {
        ChangeFeed::subscribe(self.remote.as_ref()).await
    }

    /// Apply one delivered batch to the table of `kind`.
    ///
    /// Row visibility is left as it is; selections whose document disappeared
    /// are dropped.
    pub fn apply_remote(
        &mut self,
        kind: RecordKind,
        batch: std::result::Result<ChangeBatch, ApiError>,
    ) -> Result<()> {
        let batch = batch?;
        let applied = self.tables.get_mut(kind).apply_batch(&batch);
        self.prune_selection(kind);
        applied
    }

    /// Apply every batch already queued on the feed, returning how many were applied
    pub fn apply_pending(&mut self, feed: &mut ChangeFeed) -> Result<usize> {
        let mut applied = 0;
        while let Some((kind, batch)) = feed.try_next() {
            self.apply_remote(kind, batch)?;
            applied += 1;
        }
        Ok(applied)
    }

    fn prune_selection(&mut self, kind: RecordKind) {
        let Some(id) = self.selection.get(kind) else {
            return;
        };
        if self.table(kind).position(id).is_some() {
            return;
        }
        debug!("[AppContext] Selected {} {} is gone", kind, id);
        *self.selection.slot(kind) = None;
        match kind {
            RecordKind::Vehicles => {
                self.vehicle_details = None;
                self.tables.services.table_mut().show_all_rows();
            }
            RecordKind::Services => self.service_form.clear(now()),
            RecordKind::Customers => {}
        }
    }

    fn row_id(&self, kind: RecordKind, row: usize) -> Result<DocumentId> {
        Ok(self.table(kind).row(row)?.id().to_string())
    }

    /// Entry form for a new customer or vehicle.
    ///
    /// A vehicle form preselects the selected customer as owner.
    pub fn open_entry_form(&self, kind: RecordKind) -> Result<EntryForm> {
        EntryForm::for_kind(
            kind,
            self.table(RecordKind::Customers),
            self.selection.customer.as_deref(),
        )
    }

    /// Add the form's record to its collection. The row appears with the next ADDED.
    pub async fn submit_entry(&self, form: &EntryForm) -> Result<DocumentId> {
        let collection = form.kind().collection();
        let id = self.remote.add_document(collection, form.data()).await?;
        info!("[AppContext] Added {} to {}", id, collection);
        Ok(id)
    }

    /// Delete the selected record of `kind` after confirmation.
    ///
    /// Returns `false` when nothing is selected or the user declines. The local
    /// row is removed before the remote delete is issued.
    pub async fn delete_selected(
        &mut self,
        kind: RecordKind,
        confirmer: &mut dyn Confirmer,
    ) -> Result<bool> {
        let Some(id) = self.selection.get(kind).map(str::to_string) else {
            return Ok(false);
        };
        if !confirmer.confirm(&ConfirmRequest::delete()).await {
            return Ok(false);
        }

        self.tables.get_mut(kind).table_mut().remove_row(&id);
        self.prune_selection(kind);
        self.remote.delete_document(kind.collection(), &id).await?;
        info!("[AppContext] Deleted {} from {}", id, kind.collection());
        Ok(true)
    }

    /// Add the service form as a record of the selected vehicle, then clear the form
    pub async fn add_service(&mut self) -> Result<DocumentId> {
        let Some(vehicle_id) = self.selection.vehicle.clone() else {
            return Err(ServisError::SelectionRequired {
                kind: RecordKind::Vehicles,
                message: "Prvo odaberite vozilo.",
            });
        };
        let fields = self.service_form.to_new_record(&vehicle_id)?;
        let id = self
            .remote
            .add_document(RecordKind::Services.collection(), fields)
            .await?;
        info!("[AppContext] Added service {} for vehicle {}", id, vehicle_id);
        self.service_form.clear(now());
        Ok(id)
    }

    /// Overwrite the selected service with the form after confirmation.
    ///
    /// Returns `false` when the user declines.
    pub async fn update_service(&mut self, confirmer: &mut dyn Confirmer) -> Result<bool> {
        let Some(service_id) = self.selection.service.clone() else {
            return Err(ServisError::SelectionRequired {
                kind: RecordKind::Services,
                message: "Prvo odaberite servis.",
            });
        };
        let fields = self.service_form.to_fields()?;
        if !confirmer.confirm(&ConfirmRequest::service_update()).await {
            return Ok(false);
        }
        self.remote
            .update_document(RecordKind::Services.collection(), &service_id, fields)
            .await?;
        info!("[AppContext] Updated service {}", service_id);
        Ok(true)
    }

    /// Edit one cell of a table and propagate it after confirmation
    pub async fn edit_cell(
        &mut self,
        kind: RecordKind,
        row: usize,
        column: usize,
        text: String,
        confirmer: &mut dyn Confirmer,
    ) -> Result<EditOutcome> {
        self.tables
            .get_mut(kind)
            .edit_cell(self.remote.as_ref(), confirmer, row, column, text)
            .await
    }

    pub fn select_customer(&mut self, row: Option<usize>) -> Result<()> {
        self.selection.customer = row.map(|r| self.row_id(RecordKind::Customers, r)).transpose()?;
        Ok(())
    }

    /// Select a vehicle, load its details and show only its services.
    ///
    /// `None` clears the selection and shows every service row.
    pub async fn select_vehicle(&mut self, row: Option<usize>) -> Result<Option<&VehicleDetails>> {
        let Some(row) = row else {
            self.selection.vehicle = None;
            self.vehicle_details = None;
            self.tables.services.table_mut().show_all_rows();
            return Ok(None);
        };

        let id = self.row_id(RecordKind::Vehicles, row)?;
        let fields = self
            .remote
            .get_document(RecordKind::Vehicles.collection(), &id)
            .await?;
        if let Some(reference) = RecordKind::Services.reference_field() {
            apply_reference_filter(self.tables.services.table_mut(), reference, Some(&id));
        }
        self.selection.vehicle = Some(id);
        self.vehicle_details = Some(VehicleDetails::from_fields(&fields));
        Ok(self.vehicle_details.as_ref())
    }

    /// Select a service and load it into the form; `None` clears the form
    pub async fn select_service(&mut self, row: Option<usize>) -> Result<()> {
        let Some(row) = row else {
            self.selection.service = None;
            self.service_form.clear(now());
            return Ok(());
        };

        let id = self.row_id(RecordKind::Services, row)?;
        let fields = self
            .remote
            .get_document(RecordKind::Services.collection(), &id)
            .await?;
        self.selection.service = Some(id);
        self.service_form.load(&fields)
    }

    /// Show only customers with a column containing `text`, ignoring case
    pub fn filter_customers(&mut self, text: &str) {
        self.customer_filter = text.to_string();
        apply_text_filter(self.tables.customers.table_mut(), text);
    }

    /// Persist a new interface font size
    pub fn change_font_size(&mut self, font_size: u32) -> Result<()> {
        if let Err(e) = self.settings.set_font_size(font_size) {
            warn!("[AppContext] Could not save font size: {}", e);
            return Err(e);
        }
        Ok(())
    }
}
