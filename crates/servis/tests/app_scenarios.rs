//! End-to-end flows through AppContext against the in-memory collections

use std::sync::Arc;

use servis::confirm::ConfirmRequest;
use servis::core::{ChangeFeed, EditOutcome};
use servis::settings::SettingsStore;
use servis::testing::ScriptedConfirmer;
use servis::{
    AppContext, Fields, MemoryCollections, RecordKind, RemoteCollections, ServisError, Value,
};
use tempfile::TempDir;

struct Harness {
    app: AppContext,
    feed: ChangeFeed,
    remote: MemoryCollections,
    _dir: TempDir,
}

impl Harness {
    async fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let settings = SettingsStore::load(dir.path().join("settings.json")).unwrap();
        let remote = MemoryCollections::deterministic();
        let mut app = AppContext::new(Arc::new(remote.clone()), settings);
        let mut feed = app.subscribe().await.unwrap();
        // one snapshot batch per collection
        assert_eq!(app.apply_pending(&mut feed).unwrap(), 3);
        Self {
            app,
            feed,
            remote,
            _dir: dir,
        }
    }

    fn sync(&mut self) {
        self.app.apply_pending(&mut self.feed).unwrap();
    }

    fn texts(&self, kind: RecordKind, row: usize) -> Vec<String> {
        self.app
            .table(kind)
            .row(row)
            .unwrap()
            .texts()
            .map(str::to_string)
            .collect()
    }

    fn visible_ids(&self, kind: RecordKind) -> Vec<String> {
        self.app
            .table(kind)
            .visible_rows()
            .map(|(_, r)| r.id().to_string())
            .collect()
    }

    async fn add_customer(&mut self, ime: &str, prezime: &str, telefon: &str) -> String {
        let mut form = self.app.open_entry_form(RecordKind::Customers).unwrap();
        form.set("ime", ime);
        form.set("prezime", prezime);
        form.set("telefon", telefon);
        let id = self.app.submit_entry(&form).await.unwrap();
        self.sync();
        id
    }

    async fn add_service(&self, vehicle: &str, datum_vreme: &str) -> String {
        let fields = Fields::from([
            ("pripada".to_string(), Value::from(vehicle)),
            ("detalji".to_string(), Value::from("Zamena ulja")),
            ("kilometraza".to_string(), Value::Integer(100)),
            ("cena".to_string(), Value::Float(1500.0)),
            ("datum_vreme".to_string(), Value::from(datum_vreme)),
        ]);
        self.remote.add_document("servisi", fields).await.unwrap()
    }
}

#[tokio::test]
async fn new_customer_appears_with_declared_columns() {
    let mut h = Harness::new().await;
    let id = h.add_customer("Marko", "Petrović", "0611234567").await;

    assert_eq!(h.app.table(RecordKind::Customers).len(), 1);
    assert_eq!(
        h.texts(RecordKind::Customers, 0),
        vec![id.as_str(), "Marko", "Petrović", "0611234567"]
    );
}

#[tokio::test]
async fn deleting_a_customer_leaves_its_vehicle_with_a_stale_owner() {
    let mut h = Harness::new().await;
    let customer = h.add_customer("Marko", "Petrović", "0611234567").await;

    h.app.select_customer(Some(0)).unwrap();
    let mut form = h.app.open_entry_form(RecordKind::Vehicles).unwrap();
    assert_eq!(form.owner().unwrap().text, "Marko Petrović");
    form.set("model", "Golf 4");
    h.app.submit_entry(&form).await.unwrap();
    h.sync();

    let mut confirmer = ScriptedConfirmer::always(true);
    assert!(h.app.delete_selected(RecordKind::Customers, &mut confirmer).await.unwrap());
    assert_eq!(confirmer.requests, vec![ConfirmRequest::delete()]);
    assert!(h.app.table(RecordKind::Customers).is_empty());
    assert_eq!(h.app.selection().customer, None);
    h.sync();

    // no referential cleanup: the vehicle still points at the deleted customer
    let vehicles = h.app.table(RecordKind::Vehicles);
    assert_eq!(vehicles.len(), 1);
    assert_eq!(vehicles.row(0).unwrap().cell(1), Some(customer.as_str()));
    assert_eq!(h.remote.document_count("korisnici"), 0);
}

#[tokio::test]
async fn delete_without_selection_or_confirmation_does_nothing() {
    let mut h = Harness::new().await;
    h.add_customer("Ana", "Ilić", "").await;

    let mut confirmer = ScriptedConfirmer::always(true);
    assert!(!h.app.delete_selected(RecordKind::Customers, &mut confirmer).await.unwrap());
    assert!(confirmer.requests.is_empty());

    h.app.select_customer(Some(0)).unwrap();
    let mut declining = ScriptedConfirmer::always(false);
    assert!(!h.app.delete_selected(RecordKind::Customers, &mut declining).await.unwrap());
    assert_eq!(h.app.table(RecordKind::Customers).len(), 1);
    assert_eq!(h.remote.document_count("korisnici"), 1);
}

#[tokio::test]
async fn declined_edit_keeps_remote_value_and_accepted_edit_writes_it() {
    let mut h = Harness::new().await;
    let id = h.add_customer("Ana", "Ilić", "100").await;
    let telefon = h
        .app
        .table(RecordKind::Customers)
        .column_of_field("telefon")
        .unwrap();

    let mut confirmer = ScriptedConfirmer::new([false, true]);
    let outcome = h
        .app
        .edit_cell(RecordKind::Customers, 0, telefon, "150".into(), &mut confirmer)
        .await
        .unwrap();
    assert_eq!(outcome, EditOutcome::Declined);
    let stored = h.remote.get_document("korisnici", &id).await.unwrap();
    assert_eq!(stored.get("telefon"), Some(&Value::from("100")));
    // the typed text stays in the cell until the row changes remotely
    assert_eq!(h.texts(RecordKind::Customers, 0)[telefon], "150");
    assert_eq!(
        confirmer.requests[0],
        ConfirmRequest::field_update("100", "150")
    );

    let outcome = h
        .app
        .edit_cell(RecordKind::Customers, 0, telefon, "150".into(), &mut confirmer)
        .await
        .unwrap();
    assert_eq!(outcome, EditOutcome::Written { field: "telefon" });
    let stored = h.remote.get_document("korisnici", &id).await.unwrap();
    assert_eq!(stored.get("telefon"), Some(&Value::from("150")));
    h.sync();
    assert_eq!(h.texts(RecordKind::Customers, 0)[telefon], "150");
}

#[tokio::test]
async fn editing_a_derived_date_column_stays_local() {
    let mut h = Harness::new().await;
    let id = h.add_service("v1", "2024-05-17 14:30:00").await;
    h.sync();
    let datum = h.app.table(RecordKind::Services).column_of_field("datum").unwrap();

    let mut confirmer = ScriptedConfirmer::always(true);
    let outcome = h
        .app
        .edit_cell(RecordKind::Services, 0, datum, "01.01.2025.".into(), &mut confirmer)
        .await
        .unwrap();
    assert_eq!(outcome, EditOutcome::Unmapped);
    assert!(confirmer.requests.is_empty());
    let stored = h.remote.get_document("servisi", &id).await.unwrap();
    assert_eq!(stored.get("datum_vreme"), Some(&Value::from("2024-05-17 14:30:00")));
}

#[tokio::test]
async fn editing_the_id_column_is_discarded() {
    let mut h = Harness::new().await;
    let id = h.add_customer("Ana", "Ilić", "0641112223").await;

    let mut confirmer = ScriptedConfirmer::always(true);
    let outcome = h
        .app
        .edit_cell(RecordKind::Customers, 0, 0, "x".into(), &mut confirmer)
        .await
        .unwrap();
    assert_eq!(outcome, EditOutcome::Unmapped);
    assert!(confirmer.requests.is_empty());
    assert_eq!(h.texts(RecordKind::Customers, 0)[0], id);
    assert_eq!(h.remote.document_count("korisnici"), 1);
    assert!(h.remote.get_document("korisnici", &id).await.is_ok());
}

#[tokio::test]
async fn vehicle_selection_filters_services_and_clearing_restores_them() {
    let mut h = Harness::new().await;
    let passat = h
        .remote
        .add_document(
            "vozila",
            Fields::from([
                ("model".to_string(), Value::from("Passat")),
                ("godiste".to_string(), Value::Integer(2008)),
            ]),
        )
        .await
        .unwrap();
    let golf = h
        .remote
        .add_document("vozila", Fields::from([("model".to_string(), Value::from("Golf"))]))
        .await
        .unwrap();
    let s1 = h.add_service(&passat, "2024-01-10 08:00:00").await;
    let s2 = h.add_service(&golf, "2024-02-10 09:00:00").await;
    let s3 = h.add_service(&passat, "2024-03-10 10:00:00").await;
    h.sync();

    let details = h.app.select_vehicle(Some(0)).await.unwrap().cloned().unwrap();
    assert_eq!(details.model, "Passat");
    assert_eq!(details.godiste, "2008");
    assert_eq!(h.visible_ids(RecordKind::Services), vec![s1.clone(), s3.clone()]);

    h.app.select_vehicle(Some(1)).await.unwrap();
    assert_eq!(h.visible_ids(RecordKind::Services), vec![s2.clone()]);

    assert!(h.app.select_vehicle(None).await.unwrap().is_none());
    assert_eq!(h.visible_ids(RecordKind::Services), vec![s1, s2, s3]);
    assert!(h.app.vehicle_details().is_none());
}

#[tokio::test]
async fn adding_a_service_requires_a_vehicle() {
    let mut h = Harness::new().await;
    let err = h.app.add_service().await.unwrap_err();
    assert!(err.is_warning());
    assert_eq!(err.to_string(), "Prvo odaberite vozilo.");

    let vehicle = h.remote.add_document("vozila", Fields::new()).await.unwrap();
    h.sync();
    h.app.select_vehicle(Some(0)).await.unwrap();
    h.app.service_form_mut().details = "Kočnice".into();
    h.app.service_form_mut().mileage = "120000".into();
    let id = h.app.add_service().await.unwrap();
    assert!(h.app.service_form().details.is_empty());

    let stored = h.remote.get_document("servisi", &id).await.unwrap();
    assert_eq!(stored.get("pripada"), Some(&Value::from(vehicle.as_str())));
    assert_eq!(stored.get("kilometraza"), Some(&Value::Integer(120000)));
    assert_eq!(stored.get("cena"), Some(&Value::Float(0.0)));
}

#[tokio::test]
async fn updating_a_service_loads_confirms_and_writes() {
    let mut h = Harness::new().await;
    let mut confirmer = ScriptedConfirmer::new([false, true]);
    let err = h.app.update_service(&mut confirmer).await.unwrap_err();
    assert!(matches!(err, ServisError::SelectionRequired { kind: RecordKind::Services, .. }));
    assert_eq!(err.to_string(), "Prvo odaberite servis.");

    let id = h.add_service("v1", "2023-11-02 16:40:00").await;
    h.sync();
    h.app.select_service(Some(0)).await.unwrap();
    assert_eq!(h.app.service_form().mileage, "100");
    assert_eq!(h.app.service_form().price, "1500.0");

    h.app.service_form_mut().mileage = "150".into();
    assert!(!h.app.update_service(&mut confirmer).await.unwrap());
    let stored = h.remote.get_document("servisi", &id).await.unwrap();
    assert_eq!(stored.get("kilometraza"), Some(&Value::Integer(100)));

    assert!(h.app.update_service(&mut confirmer).await.unwrap());
    assert_eq!(
        confirmer.requests,
        vec![ConfirmRequest::service_update(), ConfirmRequest::service_update()]
    );
    let stored = h.remote.get_document("servisi", &id).await.unwrap();
    assert_eq!(stored.get("kilometraza"), Some(&Value::Integer(150)));
    assert_eq!(stored.get("datum"), Some(&Value::from("2023-11-02")));
    assert_eq!(stored.get("vreme"), Some(&Value::from("16:40:00")));

    h.app.select_service(None).await.unwrap();
    assert!(h.app.service_form().mileage.is_empty());
}

#[tokio::test]
async fn customer_filter_is_idempotent() {
    let mut h = Harness::new().await;
    h.add_customer("Marko", "Petrović", "0611234567").await;
    h.add_customer("Jelena", "Marković", "0647654321").await;
    h.add_customer("Ana", "Ilić", "0601112223").await;

    h.app.filter_customers("mark");
    let once = h.visible_ids(RecordKind::Customers);
    h.app.filter_customers("mark");
    assert_eq!(h.visible_ids(RecordKind::Customers), once);
    assert_eq!(once.len(), 2);
    assert_eq!(h.app.customer_filter(), "mark");

    h.app.filter_customers("");
    assert_eq!(h.visible_ids(RecordKind::Customers).len(), 3);
}

#[tokio::test]
async fn remote_removal_of_the_selected_vehicle_clears_the_cross_filter() {
    let mut h = Harness::new().await;
    let vehicle = h.remote.add_document("vozila", Fields::new()).await.unwrap();
    h.add_service(&vehicle, "2024-01-10 08:00:00").await;
    h.add_service("other", "2024-01-11 08:00:00").await;
    h.sync();

    h.app.select_vehicle(Some(0)).await.unwrap();
    assert_eq!(h.visible_ids(RecordKind::Services).len(), 1);

    h.remote.delete_document("vozila", &vehicle).await.unwrap();
    h.sync();
    assert_eq!(h.app.selection().vehicle, None);
    assert_eq!(h.visible_ids(RecordKind::Services).len(), 2);
}

#[tokio::test]
async fn font_size_change_is_persisted() {
    let mut h = Harness::new().await;
    h.app.change_font_size(18).unwrap();
    let path = h.app.settings().path().to_path_buf();
    let reloaded = SettingsStore::load(path).unwrap();
    assert_eq!(reloaded.settings().font_size, 18);
}
