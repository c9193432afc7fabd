use async_trait::async_trait;

use crate::errors::Result;
use crate::funds::funds_model::{Fund, NewFund};

#[async_trait]
pub trait FundRepositoryTrait: Send + Sync {
    async fn get_fund(&self, fund_id: &str) -> Result<Option<Fund>>;
    async fn list_funds(&self) -> Result<Vec<Fund>>;
    async fn create_fund(&self, new_fund: NewFund) -> Result<Fund>;
}

#[async_trait]
pub trait FundServiceTrait: Send + Sync {
    async fn create_fund(&self, new_fund: NewFund) -> Result<Fund>;
    async fn get_fund(&self, fund_id: &str) -> Result<Fund>;
    async fn list_funds(&self) -> Result<Vec<Fund>>;
}
