//! 마크 가격 스냅샷 캐시.
//!
//! `allMids` 가격 테이블을 TTL(기본 10초) 동안 캐싱합니다. 규칙:
//! - 유효 기간 내 조회는 네트워크 접근 없이 같은 스냅샷을 반환합니다.
//! - 만료 후 조회는 새로 가져와 스냅샷 전체를 교체합니다.
//! - 갱신에 실패하면 캐시와 만료 시각을 건드리지 않고 **빈 테이블**을
//!   반환합니다. 다음 조회가 즉시 재시도합니다. 만료된 이전 스냅샷을
//!   대신 내보내지 않습니다.
//!
//! 시계는 주입식이어서 테스트가 시간을 직접 제어합니다.

use crate::client::InfoClient;
use crate::types::PriceTable;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error};

/// 시각 제공자.
pub trait Clock: Send + Sync {
    /// 현재 시각을 반환합니다.
    fn now(&self) -> DateTime<Utc>;
}

/// 시스템 시계.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// 만료 시각이 붙은 가격 테이블 스냅샷.
#[derive(Debug, Clone)]
struct PriceSnapshot {
    table: Arc<PriceTable>,
    expires_at: DateTime<Utc>,
}

impl PriceSnapshot {
    fn is_valid(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// TTL 기반 가격 캐시.
///
/// 공유 상태는 스냅샷 하나뿐이며 `RwLock`으로 보호됩니다. 만료 직후
/// 동시 호출이 중복 갱신을 일으킬 수 있지만 마지막 스냅샷이 원자적으로
/// 교체되므로 정확성에는 영향이 없습니다.
pub struct PriceCache {
    client: Arc<InfoClient>,
    ttl: chrono::Duration,
    clock: Arc<dyn Clock>,
    snapshot: RwLock<Option<PriceSnapshot>>,
}

impl PriceCache {
    /// 시스템 시계를 사용하는 캐시를 생성합니다.
    pub fn new(client: Arc<InfoClient>, ttl_secs: u64) -> Self {
        Self::with_clock(client, ttl_secs, Arc::new(SystemClock))
    }

    /// 주어진 시계를 사용하는 캐시를 생성합니다.
    pub fn with_clock(client: Arc<InfoClient>, ttl_secs: u64, clock: Arc<dyn Clock>) -> Self {
        Self {
            client,
            ttl: chrono::Duration::seconds(ttl_secs as i64),
            clock,
            snapshot: RwLock::new(None),
        }
    }

    /// 가격 테이블을 반환합니다.
    ///
    /// 실패하더라도 에러를 반환하지 않습니다. 갱신 실패는 로그를 남기고
    /// 빈 테이블을 돌려주며, 호출부의 폴백 체인이 이를 흡수합니다.
    pub async fn get_prices(&self) -> Arc<PriceTable> {
        let now = self.clock.now();

        {
            let guard = self.snapshot.read().await;
            if let Some(snapshot) = guard.as_ref() {
                if snapshot.is_valid(now) {
                    debug!("price cache hit");
                    return Arc::clone(&snapshot.table);
                }
            }
        }

        self.refresh(now).await
    }

    /// 가격 테이블을 새로 가져와 스냅샷을 교체합니다.
    async fn refresh(&self, now: DateTime<Utc>) -> Arc<PriceTable> {
        match self.client.fetch_all_mids().await {
            Ok(table) => {
                let table = Arc::new(table);
                let snapshot = PriceSnapshot {
                    table: Arc::clone(&table),
                    expires_at: now + self.ttl,
                };
                *self.snapshot.write().await = Some(snapshot);
                debug!(symbols = table.len(), "price table refreshed");
                table
            }
            Err(e) => {
                error!("Error fetching mark prices: {}", e);
                Arc::new(PriceTable::new())
            }
        }
    }
}
