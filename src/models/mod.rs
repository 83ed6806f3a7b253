pub mod candle;
pub mod request;
pub mod section;
pub mod signal;
pub mod timeframe;

pub use candle::{Candle, CandleSeries, MarketDataset};
pub use request::{AnalysisRequest, Provider, ProviderResult};
pub use section::{DisplaySection, SectionKind, TopicTag};
pub use signal::{SignalType, TradingSignal};
pub use timeframe::Timeframe;
