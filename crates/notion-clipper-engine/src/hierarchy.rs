//! # Hierarchy Flattening
//!
//! The document API does not accept nested `children` in a creation
//! payload. A parent is created first with `has_children` set, and its
//! children are appended afterwards in a separate call addressed to the id
//! the API assigned to it.
//!
//! [`generate_api_instructions`] turns a block tree into that two-phase
//! form:
//!
//! - `root_blocks`: the top level, children stripped
//! - `child_operations`: one entry per parent with children, in document
//!   order. `parent_block_index` indexes the batch the parent was created
//!   in; deeper levels hang off `nested_operations` and index into the
//!   operation's own `child_blocks`.
//!
//! [`replay`] walks the instructions in protocol order against a
//! [`BlockAppender`], so an operation never runs before its parent exists.

use serde::Serialize;

use crate::blocks::Block;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiInstructions {
    pub root_blocks: Vec<Block>,
    pub child_operations: Vec<ChildOperation>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChildOperation {
    /// Index of the parent within the batch it was created in.
    pub parent_block_index: usize,
    pub child_blocks: Vec<Block>,
    /// Operations whose parents are among `child_blocks`.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub nested_operations: Vec<ChildOperation>,
}

pub fn generate_api_instructions(blocks: &[Block]) -> ApiInstructions {
    let (root_blocks, child_operations) = flatten(blocks.to_vec());
    ApiInstructions {
        root_blocks,
        child_operations,
    }
}

/// Strips one level of children, returning the flat batch and the
/// operations that restore the stripped levels.
fn flatten(blocks: Vec<Block>) -> (Vec<Block>, Vec<ChildOperation>) {
    let mut batch = Vec::with_capacity(blocks.len());
    let mut operations = vec![];
    for (index, block) in blocks.into_iter().enumerate() {
        let (block, children) = block.detach_children();
        if !children.is_empty() {
            let (child_blocks, nested_operations) = flatten(children);
            operations.push(ChildOperation {
                parent_block_index: index,
                child_blocks,
                nested_operations,
            });
        }
        batch.push(block);
    }
    (batch, operations)
}

impl ApiInstructions {
    /// Every block, at any depth, in creation order.
    pub fn all_blocks(&self) -> Vec<&Block> {
        fn walk<'a>(ops: &'a [ChildOperation], out: &mut Vec<&'a Block>) {
            for op in ops {
                out.extend(op.child_blocks.iter());
                walk(&op.nested_operations, out);
            }
        }
        let mut out: Vec<&Block> = self.root_blocks.iter().collect();
        walk(&self.child_operations, &mut out);
        out
    }
}

/// A document API client able to append a batch of blocks under a parent.
pub trait BlockAppender {
    type Id: Clone;
    type Error: std::error::Error + 'static;

    /// Appends `blocks` under `parent`; returns their ids in order.
    fn append(&mut self, parent: &Self::Id, blocks: &[Block]) -> Result<Vec<Self::Id>, Self::Error>;
}

#[derive(Debug, thiserror::Error)]
pub enum ReplayError<E: std::error::Error + 'static> {
    #[error("appending blocks failed")]
    Append(#[source] E),
    #[error("appender returned {returned} ids for {expected} blocks")]
    IdCountMismatch { expected: usize, returned: usize },
}

/// Creates the root blocks under `parent`, then every child operation in
/// order, each addressed to the id its parent was assigned.
pub fn replay<A: BlockAppender>(
    instructions: &ApiInstructions,
    parent: &A::Id,
    appender: &mut A,
) -> Result<(), ReplayError<A::Error>> {
    let ids = append_batch(appender, parent, &instructions.root_blocks)?;
    replay_operations(&instructions.child_operations, &ids, appender)
}

fn replay_operations<A: BlockAppender>(
    operations: &[ChildOperation],
    batch_ids: &[A::Id],
    appender: &mut A,
) -> Result<(), ReplayError<A::Error>> {
    for op in operations {
        let parent = batch_ids
            .get(op.parent_block_index)
            .ok_or(ReplayError::IdCountMismatch {
                expected: op.parent_block_index + 1,
                returned: batch_ids.len(),
            })?;
        let ids = append_batch(appender, parent, &op.child_blocks)?;
        replay_operations(&op.nested_operations, &ids, appender)?;
    }
    Ok(())
}

fn append_batch<A: BlockAppender>(
    appender: &mut A,
    parent: &A::Id,
    blocks: &[Block],
) -> Result<Vec<A::Id>, ReplayError<A::Error>> {
    if blocks.is_empty() {
        return Ok(vec![]);
    }
    let ids = appender.append(parent, blocks).map_err(ReplayError::Append)?;
    if ids.len() != blocks.len() {
        return Err(ReplayError::IdCountMismatch {
            expected: blocks.len(),
            returned: ids.len(),
        });
    }
    Ok(ids)
}
