pub mod actor;
pub mod customer;
pub mod invoice;

pub use actor::{
    Actor, ActorResponse, ActorWithStats, ActorWithStatsResponse, CreateActor, Role, UpdateActor,
};
pub use customer::{CreateCustomer, Customer, CustomerResponse, UpdateCustomer};
pub use invoice::{
    CreateInvoice, DateRange, Invoice, InvoiceFilter, InvoiceResponse, InvoiceStatus,
    InvoiceWithDetails, LineItem, LineItemResponse, NewLineItem,
};
