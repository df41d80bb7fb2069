//! # Typed Module
//!
//! Type-safe handlers: query, path and body arrive as Rust structs and the
//! response is any `Serialize` value.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use serde::{Deserialize, Serialize};
//! use typeroute::typed::{typed_handler, TypedHandler, TypedRequest};
//!
//! #[derive(Deserialize)]
//! struct PetPath { id: i64 }
//!
//! #[derive(Deserialize)]
//! struct Empty {}
//!
//! #[derive(Serialize)]
//! struct Pet { id: i64, name: String }
//!
//! struct GetPet;
//!
//! #[async_trait::async_trait]
//! impl TypedHandler<AppContext> for GetPet {
//!     type Query = Empty;
//!     type Path = PetPath;
//!     type Body = Empty;
//!     type Response = Pet;
//!
//!     async fn handle(&self, req: TypedRequest<Empty, PetPath, Empty, AppContext>) -> anyhow::Result<Pet> {
//!         Ok(Pet { id: req.path.id, name: "Fluffy".into() })
//!     }
//! }
//!
//! let route = Route::builder(Kind::Public, Method::GET, "/pets/{id}")
//!     .path_schema(pet_path_schema)
//!     .handler_arc(typed_handler(GetPet));
//! ```
//!
//! The route's schemas stay the source of truth for validation; the typed
//! structs only decide how validated data is read.

mod core;

pub use core::{typed_handler, TypedHandler, TypedRequest};
