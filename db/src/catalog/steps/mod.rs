//! Ordered recipe steps.
//!
//! Every recipe's steps are numbered `1..=N` with no gaps or duplicates.
//! [`StepSequencer`] is the only writer of `step_num`: each mutating call runs
//! in one transaction that holds a per-recipe advisory lock, renumbers the
//! neighbours through [`store::shift`], re-checks density and commits. Any
//! error drops the transaction, which rolls it back.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{error::require_text, Result, StoreError};

pub mod sequence;
mod store;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct RecipeStep {
    pub step_id: Uuid,
    pub recipe_id: Uuid,
    pub step_num: i32,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Optional text changes applied together with a move.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StepEdit {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl StepEdit {
    fn check(&self) -> Result<()> {
        if let Some(name) = &self.name {
            require_text("step name", name)?;
        }

        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct StepSequencer {
    pool: PgPool,
}

impl StepSequencer {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Appends a step after the recipe's current last step.
    #[tracing::instrument(name = "StepSequencer::insert", skip(self, description), err)]
    pub async fn insert(&self, recipe_id: Uuid, name: &str, description: &str) -> Result<RecipeStep> {
        require_text("step name", name)?;

        let mut transaction = self.pool.begin().await?;

        store::lock_recipe(&mut transaction, recipe_id).await?;
        let step = store::append(&mut transaction, recipe_id, name, description)
            .await
            .map_err(|err| match err {
                StoreError::NotFound(_) => StoreError::not_found("recipe", recipe_id),
                other => other,
            })?;

        transaction.commit().await?;

        tracing::info!(step_id = %step.step_id, step_num = step.step_num, "Appended recipe step");

        Ok(step)
    }

    /// Moves a step to `new_step_num`, sliding its neighbours to keep the
    /// numbering dense, and optionally renames it in the same transaction.
    #[tracing::instrument(name = "StepSequencer::move_to", skip(self, edit), err)]
    pub async fn move_to(&self, step_id: Uuid, new_step_num: i32, edit: StepEdit) -> Result<RecipeStep> {
        sequence::check_position(new_step_num)?;
        edit.check()?;

        let mut transaction = self.pool.begin().await?;

        let recipe_id = store::owning_recipe(&mut transaction, step_id).await?;
        store::lock_recipe(&mut transaction, recipe_id).await?;

        let position = store::locate(&mut transaction, step_id).await?;
        if position.recipe_id != recipe_id {
            return Err(StoreError::Conflict(format!(
                "step {step_id} changed recipe while being moved"
            )));
        }

        if let Some(shift) =
            sequence::plan_move(position.step_num, new_step_num, position.max_step_num)?
        {
            let shifted = store::shift(&mut transaction, recipe_id, shift).await?;
            tracing::debug!(?shift, shifted, "Shifted neighbouring steps");
        }

        let step = store::place(
            &mut transaction,
            step_id,
            new_step_num,
            edit.name.as_deref(),
            edit.description.as_deref(),
        )
        .await?;

        ensure_dense(&mut transaction, recipe_id).await?;
        transaction.commit().await?;

        tracing::info!(from = position.step_num, to = new_step_num, "Moved recipe step");

        Ok(step)
    }

    /// Deletes a step and pulls every later step back by one.
    #[tracing::instrument(name = "StepSequencer::remove", skip(self), err)]
    pub async fn remove(&self, step_id: Uuid) -> Result<()> {
        let mut transaction = self.pool.begin().await?;

        let recipe_id = store::owning_recipe(&mut transaction, step_id).await?;
        store::lock_recipe(&mut transaction, recipe_id).await?;

        let position = store::locate(&mut transaction, step_id).await?;
        store::delete_one(&mut transaction, step_id).await?;

        if let Some(shift) = sequence::plan_removal(position.step_num, position.max_step_num) {
            store::shift(&mut transaction, recipe_id, shift).await?;
        }

        ensure_dense(&mut transaction, recipe_id).await?;
        transaction.commit().await?;

        tracing::info!(%recipe_id, removed = position.step_num, "Removed recipe step");

        Ok(())
    }

    #[tracing::instrument(name = "StepSequencer::remove_all_for_recipe", skip(self), err)]
    pub async fn remove_all_for_recipe(&self, recipe_id: Uuid) -> Result<u64> {
        let mut transaction = self.pool.begin().await?;

        store::lock_recipe(&mut transaction, recipe_id).await?;
        let removed = store::delete_all(&mut transaction, recipe_id).await?;

        transaction.commit().await?;

        Ok(removed)
    }

    pub async fn get(&self, step_id: Uuid) -> Result<RecipeStep> {
        sqlx::query_as::<_, RecipeStep>(
            "
            SELECT
                step_id,
                recipe_id,
                step_num,
                name,
                description,
                created_at,
                updated_at
            FROM recipe_steps
            WHERE step_id = $1
            ",
        )
        .bind(step_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::not_found("recipe step", step_id))
    }

    pub async fn list_for_recipe(&self, recipe_id: Uuid) -> Result<Vec<RecipeStep>> {
        let steps = sqlx::query_as::<_, RecipeStep>(
            "
            SELECT
                step_id,
                recipe_id,
                step_num,
                name,
                description,
                created_at,
                updated_at
            FROM recipe_steps
            WHERE recipe_id = $1
            ORDER BY step_num
            ",
        )
        .bind(recipe_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(steps)
    }
}

async fn ensure_dense(conn: &mut sqlx::PgConnection, recipe_id: Uuid) -> Result<()> {
    let positions = store::positions(conn, recipe_id).await?;

    if !sequence::is_dense(&positions) {
        tracing::error!(%recipe_id, ?positions, "Step numbering lost density");
        return Err(StoreError::Conflict(format!(
            "steps of recipe {recipe_id} are not numbered 1..{}",
            positions.len()
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils;

    async fn names_in_order(sequencer: &StepSequencer, recipe_id: Uuid) -> Vec<(i32, String)> {
        sequencer
            .list_for_recipe(recipe_id)
            .await
            .unwrap()
            .into_iter()
            .map(|step| (step.step_num, step.name))
            .collect()
    }

    #[sqlx::test(migrator = "crate::MIGRATOR")]
    async fn inserts_number_from_one(pool: PgPool) {
        let (_salad, recipe) = test_utils::salad_with_recipe(&pool, "Caprese").await;
        let sequencer = StepSequencer::new(pool);

        let a = sequencer.insert(recipe.recipe_id, "A", "").await.unwrap();
        let b = sequencer.insert(recipe.recipe_id, "B", "").await.unwrap();
        let c = sequencer.insert(recipe.recipe_id, "C", "").await.unwrap();

        assert_eq!((a.step_num, b.step_num, c.step_num), (1, 2, 3));
    }

    #[sqlx::test(migrator = "crate::MIGRATOR")]
    async fn insert_into_unknown_recipe_is_not_found(pool: PgPool) {
        let sequencer = StepSequencer::new(pool);

        let err = sequencer
            .insert(Uuid::new_v4(), "Chop", "")
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[sqlx::test(migrator = "crate::MIGRATOR")]
    async fn moving_last_step_first_rotates(pool: PgPool) {
        let (recipe, steps) = test_utils::recipe_with_steps(&pool, &["A", "B", "C"]).await;
        let sequencer = StepSequencer::new(pool);

        let moved = sequencer
            .move_to(steps[2].step_id, 1, StepEdit::default())
            .await
            .unwrap();
        assert_eq!(moved.step_num, 1);

        assert_eq!(
            names_in_order(&sequencer, recipe.recipe_id).await,
            vec![(1, "C".into()), (2, "A".into()), (3, "B".into())]
        );
    }

    #[sqlx::test(migrator = "crate::MIGRATOR")]
    async fn moving_first_step_last_slides_others_back(pool: PgPool) {
        let (recipe, steps) = test_utils::recipe_with_steps(&pool, &["A", "B", "C", "D"]).await;
        let sequencer = StepSequencer::new(pool);

        sequencer
            .move_to(steps[0].step_id, 4, StepEdit::default())
            .await
            .unwrap();

        assert_eq!(
            names_in_order(&sequencer, recipe.recipe_id).await,
            vec![
                (1, "B".into()),
                (2, "C".into()),
                (3, "D".into()),
                (4, "A".into())
            ]
        );
    }

    #[sqlx::test(migrator = "crate::MIGRATOR")]
    async fn moving_to_current_position_changes_nothing(pool: PgPool) {
        let (recipe, steps) = test_utils::recipe_with_steps(&pool, &["A", "B", "C"]).await;
        let sequencer = StepSequencer::new(pool);

        sequencer
            .move_to(steps[1].step_id, 2, StepEdit::default())
            .await
            .unwrap();

        assert_eq!(
            names_in_order(&sequencer, recipe.recipe_id).await,
            vec![(1, "A".into()), (2, "B".into()), (3, "C".into())]
        );
    }

    #[sqlx::test(migrator = "crate::MIGRATOR")]
    async fn moving_past_the_end_is_out_of_range(pool: PgPool) {
        let (recipe, steps) = test_utils::recipe_with_steps(&pool, &["A", "B", "C"]).await;
        let sequencer = StepSequencer::new(pool);

        let err = sequencer
            .move_to(steps[0].step_id, 4, StepEdit::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::OutOfRange {
                requested: 4,
                max: 3
            }
        ));

        let err = sequencer
            .move_to(steps[0].step_id, 0, StepEdit::default())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidArgument(_)));

        assert_eq!(
            names_in_order(&sequencer, recipe.recipe_id).await,
            vec![(1, "A".into()), (2, "B".into()), (3, "C".into())]
        );
    }

    #[sqlx::test(migrator = "crate::MIGRATOR")]
    async fn move_can_rename_in_the_same_call(pool: PgPool) {
        let (_recipe, steps) = test_utils::recipe_with_steps(&pool, &["A", "B"]).await;
        let sequencer = StepSequencer::new(pool);

        let moved = sequencer
            .move_to(
                steps[0].step_id,
                2,
                StepEdit {
                    name: Some("Dress".into()),
                    description: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(moved.step_num, 2);
        assert_eq!(moved.name, "Dress");
        assert_eq!(moved.description, steps[0].description);
    }

    #[sqlx::test(migrator = "crate::MIGRATOR")]
    async fn removing_closes_the_gap(pool: PgPool) {
        let (recipe, steps) = test_utils::recipe_with_steps(&pool, &["A", "B", "C", "D"]).await;
        let sequencer = StepSequencer::new(pool);

        sequencer.remove(steps[1].step_id).await.unwrap();

        assert_eq!(
            names_in_order(&sequencer, recipe.recipe_id).await,
            vec![(1, "A".into()), (2, "C".into()), (3, "D".into())]
        );

        let err = sequencer.remove(steps[1].step_id).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[sqlx::test(migrator = "crate::MIGRATOR")]
    async fn remove_all_leaves_an_empty_list(pool: PgPool) {
        let (recipe, _steps) = test_utils::recipe_with_steps(&pool, &["A", "B", "C"]).await;
        let sequencer = StepSequencer::new(pool);

        let removed = sequencer
            .remove_all_for_recipe(recipe.recipe_id)
            .await
            .unwrap();
        assert_eq!(removed, 3);
        assert!(sequencer
            .list_for_recipe(recipe.recipe_id)
            .await
            .unwrap()
            .is_empty());

        let first = sequencer.insert(recipe.recipe_id, "Again", "").await.unwrap();
        assert_eq!(first.step_num, 1);
    }

    #[sqlx::test(migrator = "crate::MIGRATOR")]
    async fn mixed_operations_stay_dense(pool: PgPool) {
        let (recipe, _steps) = test_utils::recipe_with_steps(&pool, &["A", "B", "C", "D", "E"]).await;
        let sequencer = StepSequencer::new(pool);

        let steps = sequencer.list_for_recipe(recipe.recipe_id).await.unwrap();
        sequencer
            .move_to(steps[4].step_id, 2, StepEdit::default())
            .await
            .unwrap();
        sequencer.remove(steps[0].step_id).await.unwrap();
        let f = sequencer.insert(recipe.recipe_id, "F", "").await.unwrap();
        sequencer
            .move_to(f.step_id, 1, StepEdit::default())
            .await
            .unwrap();
        sequencer.remove(steps[2].step_id).await.unwrap();

        let positions: Vec<i32> = sequencer
            .list_for_recipe(recipe.recipe_id)
            .await
            .unwrap()
            .iter()
            .map(|step| step.step_num)
            .collect();
        assert_eq!(positions, vec![1, 2, 3, 4]);
        assert_eq!(
            names_in_order(&sequencer, recipe.recipe_id).await,
            vec![
                (1, "F".into()),
                (2, "E".into()),
                (3, "B".into()),
                (4, "D".into())
            ]
        );
    }

    #[sqlx::test(migrator = "crate::MIGRATOR")]
    async fn concurrent_moves_keep_numbering_dense(pool: PgPool) {
        let (recipe, steps) =
            test_utils::recipe_with_steps(&pool, &["A", "B", "C", "D", "E", "F"]).await;
        let sequencer = StepSequencer::new(pool);

        let (first, second, third) = tokio::join!(
            sequencer.move_to(steps[0].step_id, 6, StepEdit::default()),
            sequencer.move_to(steps[5].step_id, 1, StepEdit::default()),
            sequencer.remove(steps[2].step_id),
        );
        first.unwrap();
        second.unwrap();
        third.unwrap();

        let positions: Vec<i32> = sequencer
            .list_for_recipe(recipe.recipe_id)
            .await
            .unwrap()
            .iter()
            .map(|step| step.step_num)
            .collect();
        assert_eq!(positions, vec![1, 2, 3, 4, 5]);
    }
}
