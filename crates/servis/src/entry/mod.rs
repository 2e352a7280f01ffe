//! Entry dialogs: new customers and vehicles, and the service record panel

pub mod entry_form;
pub mod service_form;

pub use entry_form::{EntryForm, OwnerDirectory, OwnerField};
pub use service_form::ServiceForm;
