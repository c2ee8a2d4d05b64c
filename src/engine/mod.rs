// ==========================================
// 清洁业务数据导入 - 引擎层
// ==========================================
// 职责: 编排导入流程（清理 / 预载 / 装载 / 补丁 / 序列），不拼 SQL
// 红线: 引擎只通过 DataApi 访问目标库
// ==========================================

pub mod identity_seeder;
pub mod orchestrator;
pub mod purge;
pub mod sequence;

// 重导出核心引擎
pub use identity_seeder::{seed_table, seed_unselected, select_all, SEED_PAGE_SIZE};
pub use orchestrator::{ImportPipeline, PipelineError, PipelineOptions};
pub use purge::{PurgePlan, PurgeStep, GLOBAL_PURGE_ORDER, PURGE_ORDER};
pub use sequence::{compute_sequences, reconcile_sequences, SEQUENCE_PREFIXES};
