/// Data layer: core types, loading, filtering and aggregation.
///
/// Architecture:
/// ```text
///  generator ──► dental_data.csv
///                     │
///                     ▼
///   ┌─────────────────────┐
///   │  cache ► loader      │  parse CSV → AppointmentDataset
///   └─────────────────────┘
///                     │
///                     ▼
///   ┌─────────────────────┐
///   │  filter              │  FilterCriteria → filtered view
///   └─────────────────────┘
///          │          │
///          ▼          ▼
///   ┌──────────┐  ┌──────────┐
///   │  stats    │  │  writer   │  KPIs / groupings, CSV export
///   └──────────┘  └──────────┘
/// ```

pub mod cache;
pub mod filter;
pub mod generator;
pub mod loader;
pub mod model;
pub mod stats;
pub mod writer;
