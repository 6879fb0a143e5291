/// Data layer: core types, loading, filtering and aggregation.
///
/// Architecture:
/// ```text
///  .csv / .parquet / .json
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → MobilityDataset
///   └──────────┘
///        │
///        ▼
///   ┌─────────────────┐
///   │ MobilityDataset  │  Vec<Observation>, filter options
///   └─────────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  conjunction of four selections → row indices
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ aggregate  │  group-by means, box stats, pivot → DashboardSummary
///   └───────────┘
/// ```

pub mod aggregate;
pub mod filter;
pub mod loader;
pub mod model;
