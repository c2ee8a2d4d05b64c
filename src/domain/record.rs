// ==========================================
// 清洁业务数据导入 - 实体记录契约
// ==========================================
// 职责: 所有待写入实体的统一接口
// 红线: 记录构建后不可变; 仅在装载边界序列化为 JSON
// ==========================================

use crate::domain::types::Table;
use serde::Serialize;
use uuid::Uuid;

/// 可被批量装载器写入的实体记录
pub trait EntityRecord: Serialize {
    /// 目标表
    const TABLE: Table;

    /// 生成的稳定标识
    fn id(&self) -> Uuid;

    /// 日志与跳过报告中使用的业务代码（无业务代码的表返回 id）
    fn business_code(&self) -> String;
}

/// 为实体结构体实现 EntityRecord
///
/// `entity_record!(Service, Table::Services, service_code)` 以字段作为业务代码；
/// `entity_record!(JobLink, Table::X, |r| ...)` 以闭包计算业务代码；
/// 省略第三个参数时业务代码回退为 id。
macro_rules! entity_record {
    ($ty:ty, $table:expr) => {
        impl $crate::domain::record::EntityRecord for $ty {
            const TABLE: $crate::domain::types::Table = $table;

            fn id(&self) -> uuid::Uuid {
                self.id
            }

            fn business_code(&self) -> String {
                self.id.to_string()
            }
        }
    };
    ($ty:ty, $table:expr, |$r:ident| $code:expr) => {
        impl $crate::domain::record::EntityRecord for $ty {
            const TABLE: $crate::domain::types::Table = $table;

            fn id(&self) -> uuid::Uuid {
                self.id
            }

            fn business_code(&self) -> String {
                let $r = self;
                $code
            }
        }
    };
    ($ty:ty, $table:expr, $field:ident) => {
        impl $crate::domain::record::EntityRecord for $ty {
            const TABLE: $crate::domain::types::Table = $table;

            fn id(&self) -> uuid::Uuid {
                self.id
            }

            fn business_code(&self) -> String {
                self.$field.clone()
            }
        }
    };
}

pub(crate) use entity_record;
