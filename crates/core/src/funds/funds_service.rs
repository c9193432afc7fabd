use async_trait::async_trait;
use log::{debug, info};
use std::sync::Arc;

use super::{Fund, FundRepositoryTrait, FundServiceTrait, NewFund};
use crate::constants::DEFAULT_FUND_CURRENCY;
use crate::errors::Error;
use crate::Result;

pub struct FundService {
    fund_repository: Arc<dyn FundRepositoryTrait>,
}

impl FundService {
    pub fn new(fund_repository: Arc<dyn FundRepositoryTrait>) -> Self {
        Self { fund_repository }
    }
}

#[async_trait]
impl FundServiceTrait for FundService {
    async fn create_fund(&self, mut new_fund: NewFund) -> Result<Fund> {
        debug!("Creating fund '{}'", new_fund.name);
        new_fund.validate()?;
        new_fund.name = new_fund.name.trim().to_string();
        new_fund.currency = Some(
            new_fund
                .currency
                .map(|c| c.trim().to_ascii_uppercase())
                .unwrap_or_else(|| DEFAULT_FUND_CURRENCY.to_string()),
        );

        let fund = self.fund_repository.create_fund(new_fund).await?;
        info!("Created fund {} ({})", fund.id, fund.name);
        Ok(fund)
    }

    async fn get_fund(&self, fund_id: &str) -> Result<Fund> {
        self.fund_repository
            .get_fund(fund_id)
            .await?
            .ok_or_else(|| Error::not_found("Fund", fund_id))
    }

    async fn list_funds(&self) -> Result<Vec<Fund>> {
        self.fund_repository.list_funds().await
    }
}
