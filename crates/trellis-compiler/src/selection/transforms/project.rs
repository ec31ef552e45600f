//! Resolves which fields a selection's tuples carry.

use tracing::warn;

use super::SelectionTransform;
use crate::model::SelectionDef;
use crate::selection::{ProjectComponent, SelectionComponent, UnitContext};
use crate::{Error, Result};

pub struct Project;

impl SelectionTransform for Project {
    fn name(&self) -> &'static str {
        "project"
    }

    fn has(&self, _sel: &SelectionComponent) -> bool {
        true
    }

    /// An explicit `project` list wins. Otherwise `fields` come first,
    /// then `encodings`. Channels without a field binding are skipped.
    fn parse(&self, ctx: &UnitContext, def: &SelectionDef, sel: &mut SelectionComponent) -> Result<()> {
        sel.project.clear();
        sel.fields.clear();

        if let Some(entries) = &def.project {
            for (index, entry) in entries.iter().enumerate() {
                match (&entry.field, entry.encoding) {
                    (Some(field), None) => sel.project.push(ProjectComponent::Field(field.clone())),
                    (None, Some(channel)) => push_encoding(ctx, sel, channel),
                    _ => {
                        return Err(Error::MalformedProjection {
                            selection: sel.name.clone(),
                            index,
                        });
                    }
                }
            }
        } else {
            for field in def.fields.iter().flatten() {
                sel.project.push(ProjectComponent::Field(field.clone()));
            }
            for &channel in def.encodings.iter().flatten() {
                push_encoding(ctx, sel, channel);
            }
        }

        for p in &sel.project {
            if let Some(channel) = p.encoding() {
                sel.fields.insert(channel, p.field().to_owned());
            }
        }
        Ok(())
    }
}

fn push_encoding(ctx: &UnitContext, sel: &mut SelectionComponent, channel: trellis_core::Channel) {
    match ctx.field_def(channel).and_then(|def| def.field.clone()) {
        Some(field) => sel.project.push(ProjectComponent::Encoding { channel, field }),
        None => warn!(
            selection = %sel.name,
            channel = %channel,
            "cannot project over a channel without a field"
        ),
    }
}
