use super::{now_ms, AppState};
use crate::error::AppError;
use crate::selection::pick_and_stamp;
use crate::types::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

impl AppState {
    /// Pick a restaurant at the current time and persist the stamp
    pub async fn pick_restaurant(&self) -> Result<PickOutcome, AppError> {
        let mut rng = StdRng::from_os_rng();
        self.pick_restaurant_at(now_ms(), &mut rng).await
    }

    /// Pick as of `now` using `rng`. A failed pick writes nothing.
    pub async fn pick_restaurant_at<R: Rng + Send>(
        &self,
        now: TimestampMs,
        rng: &mut R,
    ) -> Result<PickOutcome, AppError> {
        let mut doc = self.load().await;

        let picked = pick_and_stamp(&mut doc, now, rng).map_err(|e| {
            tracing::info!("Pick refused: {}", e);
            e
        })?;
        tracing::info!(id = %picked.id, name = %picked.name, "Restaurant picked");

        let state = self.save(doc).await?;
        Ok(PickOutcome { picked, state })
    }
}
