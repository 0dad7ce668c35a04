mod client;
mod conversion;
mod document;
mod health;
mod note;
mod quote;
mod vehicle;

pub use client::{Client, InsuranceType};
pub use conversion::{LeadConversion, NewLeadConversion};
pub use document::{Document, DocumentType};
pub use health::{FloaterType, HealthInsurance};
pub use note::Note;
pub use quote::Quote;
pub use vehicle::{InsuranceCover, VehicleInsurance};
