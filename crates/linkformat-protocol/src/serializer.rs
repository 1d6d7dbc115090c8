//! Resource tree traversal.
//!
//! Descendants of the root are visited depth-first, parents before children,
//! siblings in ascending byte order of name. The root itself is never
//! emitted. A node is emitted when it is visible and matches the query set;
//! hidden or filtered nodes are still descended into.

use linkformat_core::{query, LinkFormatConfig, Resource};
use tracing::trace;

use crate::sink::LinkSink;

/// Walk `root` and feed every emitted resource to `sink`. Returns the number
/// of resources emitted.
pub fn walk<Q, S>(
    root: &dyn Resource,
    queries: &[Q],
    config: &LinkFormatConfig,
    sink: &mut S,
) -> usize
where
    Q: AsRef<str>,
    S: LinkSink,
{
    let mut stack = sorted_children(root);
    stack.reverse();
    let mut emitted = 0;

    while let Some(node) = stack.pop() {
        let target = format!("{}{}", node.path(), node.name());
        if node.visible() && query::matches(&target, node.attributes(), queries) {
            sink.begin_resource(&target);
            for (name, values) in node.attributes().sorted() {
                if !values.is_empty() {
                    sink.attribute(name, values, config);
                }
            }
            sink.end_resource();
            emitted += 1;
        } else {
            trace!(link = %target, visible = node.visible(), "resource skipped");
        }

        let mut children = sorted_children(node);
        children.reverse();
        stack.extend(children);
    }

    emitted
}

fn sorted_children(node: &dyn Resource) -> Vec<&dyn Resource> {
    let mut children = node.children();
    children.sort_by(|a, b| a.name().cmp(b.name()));
    children
}
