//! Execution plan types

use serde::Serialize;

/// A group of modules executed together
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutionBatch {
    /// 1-based batch number
    pub number: usize,
    pub modules: Vec<String>,
    pub can_execute_in_parallel: bool,
    /// Numbers of the batches this batch's modules depend on
    pub dependencies: Vec<usize>,
}

/// Ordered batches covering every resolved module exactly once
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExecutionPlan {
    pub batches: Vec<ExecutionBatch>,
}

impl ExecutionPlan {
    pub fn total_modules(&self) -> usize {
        self.batches.iter().map(|b| b.modules.len()).sum()
    }

    /// Batch number containing the module
    pub fn batch_of(&self, module_id: &str) -> Option<usize> {
        self.batches
            .iter()
            .find(|b| b.modules.iter().any(|m| m == module_id))
            .map(|b| b.number)
    }

    /// Module ids in execution order
    pub fn module_order(&self) -> impl Iterator<Item = &str> {
        self.batches
            .iter()
            .flat_map(|b| b.modules.iter().map(String::as_str))
    }

    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan() -> ExecutionPlan {
        ExecutionPlan {
            batches: vec![
                ExecutionBatch {
                    number: 1,
                    modules: vec!["framework/nextjs".into()],
                    can_execute_in_parallel: false,
                    dependencies: vec![],
                },
                ExecutionBatch {
                    number: 2,
                    modules: vec!["adapter/drizzle".into(), "adapter/zod".into()],
                    can_execute_in_parallel: true,
                    dependencies: vec![1],
                },
            ],
        }
    }

    #[test]
    fn test_batch_lookup() {
        let plan = plan();
        assert_eq!(plan.total_modules(), 3);
        assert_eq!(plan.batch_of("adapter/zod"), Some(2));
        assert_eq!(plan.batch_of("feature/auth"), None);
        assert_eq!(
            plan.module_order().collect::<Vec<_>>(),
            vec!["framework/nextjs", "adapter/drizzle", "adapter/zod"]
        );
    }
}
