//! Sponsor signing service.
//!
//! Receives unsigned action lists from clients, checks them against the
//! sponsor [`Policy`](freecpu_policy::Policy), binds them to a recent block,
//! encodes and signs them with the sponsor's keys, and hands the encoding plus
//! signatures back. The service never broadcasts.
//!
//! Endpoints:
//! - `POST /api/eos/sign`
//! - `GET /api/health`

pub mod config;
pub mod error;
pub mod handlers;
pub mod server;
pub mod sponsor;

pub use config::ServiceConfig;
pub use error::RpcError;
pub use server::{router, AppState, RpcServer};
pub use sponsor::SponsorService;
