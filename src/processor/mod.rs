mod provider;

pub use provider::ProviderProcessor;

use async_trait::async_trait;

use crate::{
    data::{PaymentRequest, PaymentStatus, ProviderResponse},
    error::ProcessError,
};

/// Whatever the router hands payments and callback outcomes to.
#[async_trait]
pub trait PaymentProcessor: Send + Sync {
    async fn initiate_payment(
        &self,
        request: PaymentRequest,
    ) -> Result<ProviderResponse, ProcessError>;

    async fn process_payment(
        &self,
        payment_id: &str,
        status: PaymentStatus,
    ) -> Result<(), ProcessError>;
}
