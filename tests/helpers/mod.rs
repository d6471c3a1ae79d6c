// Shared test helpers
//
// Included from each test binary with
//   #[macro_use]
//   #[path = "../helpers/mod.rs"]
//   mod helpers;
// so not every binary uses every helper.
#![allow(dead_code, unused_macros)]

/// Full application as the server builds it, minus logging and CORS
macro_rules! init_app {
    ($state:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .wrap(quickbill::middleware::BearerAuth::new(
                    $state.authenticator.clone(),
                ))
                .configure(|cfg| $state.configure(cfg)),
        )
        .await
    };
}

pub mod test_data;

pub use test_app::*;
pub use test_data::*;
pub use test_database::*;
