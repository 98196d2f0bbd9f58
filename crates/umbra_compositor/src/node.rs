//! Generic compositor node definitions
//!
//! A node definition declares the textures a node works with (inputs fed
//! through channels, locally owned textures, workspace-global textures),
//! the buffers it consumes, the targets it renders, and how its textures
//! map to output channels. Shadow nodes build on this in [`crate::shadow`].

use std::collections::HashMap;

use umbra_core::NamedId;

use crate::error::{CompositorError, CompositorResult};
use crate::pass::{PassDef, PassKind};
use crate::resource::TextureDef;
use crate::target::TargetDef;

/// Reserved name prefix for workspace-global textures
pub const GLOBAL_TEXTURE_PREFIX: &str = "global_";

/// Where a node texture binding comes from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextureSource {
    /// Fed by another node through an input channel
    Input,
    /// Owned by this node
    Local,
    /// Owned by the workspace, shared across nodes
    Global,
}

/// A texture name registered on a node
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChannelBinding {
    /// Position within the source's channel space
    pub index: usize,
    /// Where the texture comes from
    pub source: TextureSource,
}

/// Generic node definition
///
/// Owns the texture/channel tables and the ordered target pass groups.
#[derive(Clone, Debug)]
pub struct NodeDef {
    pub(crate) name: NamedId,
    channels: HashMap<NamedId, ChannelBinding>,
    pub(crate) local_textures: Vec<TextureDef>,
    buffer_inputs: Vec<Option<NamedId>>,
    output_channels: Vec<Option<NamedId>>,
    pub(crate) targets: Vec<TargetDef>,
}

impl NodeDef {
    /// Create an empty node definition
    pub fn new(name: &str) -> Self {
        Self {
            name: NamedId::new(name),
            channels: HashMap::new(),
            local_textures: Vec::new(),
            buffer_inputs: Vec::new(),
            output_channels: Vec::new(),
            targets: Vec::new(),
        }
    }

    /// Get the node name
    #[inline]
    pub fn name(&self) -> &NamedId {
        &self.name
    }

    /// Register a texture name against a channel index and source
    ///
    /// Global textures must carry the [`GLOBAL_TEXTURE_PREFIX`]; input and
    /// local textures must not. Each name may be registered once per node.
    pub fn add_texture_source_name(
        &mut self,
        name: &str,
        index: usize,
        source: TextureSource,
    ) -> CompositorResult<NamedId> {
        let has_global_prefix = name.starts_with(GLOBAL_TEXTURE_PREFIX);
        if source == TextureSource::Global && !has_global_prefix {
            return Err(CompositorError::invalid_configuration(
                format!(
                    "global textures must begin with the '{GLOBAL_TEXTURE_PREFIX}' prefix, \
                     got '{name}' in node '{}'",
                    self.name
                ),
                "NodeDef::add_texture_source_name",
            ));
        }
        if source != TextureSource::Global && has_global_prefix {
            return Err(CompositorError::invalid_configuration(
                format!(
                    "only global textures may begin with the '{GLOBAL_TEXTURE_PREFIX}' prefix, \
                     got '{name}' in node '{}'",
                    self.name
                ),
                "NodeDef::add_texture_source_name",
            ));
        }

        let id = NamedId::new(name);
        if self.channels.contains_key(&id) {
            return Err(CompositorError::duplicate_definition(
                format!("texture '{name}' is already registered in node '{}'", self.name),
                "NodeDef::add_texture_source_name",
            ));
        }

        self.channels.insert(id.clone(), ChannelBinding { index, source });
        Ok(id)
    }

    /// Look up where a registered texture name comes from
    pub fn texture_source(&self, name: &NamedId) -> Option<ChannelBinding> {
        self.channels.get(name).copied()
    }

    /// Number of input channels this node expects to be connected
    pub fn num_input_channels(&self) -> usize {
        self.channels
            .values()
            .filter(|binding| binding.source == TextureSource::Input)
            .count()
    }

    /// Declare a node-local texture
    pub fn add_texture_definition(&mut self, def: TextureDef) -> CompositorResult<()> {
        self.add_texture_source_name(def.name.name(), self.local_textures.len(), TextureSource::Local)?;
        self.local_textures.push(def);
        Ok(())
    }

    /// Get the node-local textures in declaration order
    #[inline]
    pub fn local_textures(&self) -> &[TextureDef] {
        &self.local_textures
    }

    /// Connect a buffer input channel to a named buffer
    pub fn add_buffer_input(&mut self, channel: usize, name: NamedId) -> CompositorResult<()> {
        if self.buffer_inputs.len() <= channel {
            self.buffer_inputs.resize(channel + 1, None);
        }
        if self.buffer_inputs[channel].is_some() {
            return Err(CompositorError::duplicate_definition(
                format!(
                    "buffer input channel {channel} is already connected in node '{}'",
                    self.name
                ),
                "NodeDef::add_buffer_input",
            ));
        }
        self.buffer_inputs[channel] = Some(name);
        Ok(())
    }

    /// Get the buffer input channel table
    #[inline]
    pub fn buffer_inputs(&self) -> &[Option<NamedId>] {
        &self.buffer_inputs
    }

    /// Expose a registered texture on an output channel
    pub fn map_output_channel(&mut self, channel: usize, name: &str) -> CompositorResult<()> {
        let id = NamedId::new(name);
        if !self.channels.contains_key(&id) {
            return Err(CompositorError::invalid_configuration(
                format!(
                    "output channel {channel} maps to unknown texture '{name}' in node '{}'",
                    self.name
                ),
                "NodeDef::map_output_channel",
            ));
        }
        if self.output_channels.len() <= channel {
            self.output_channels.resize(channel + 1, None);
        }
        self.output_channels[channel] = Some(id);
        Ok(())
    }

    /// Get the output channel table
    #[inline]
    pub fn output_channels(&self) -> &[Option<NamedId>] {
        &self.output_channels
    }

    /// Append a target pass group, returning its index
    pub fn add_target_pass(&mut self, render_target_name: &str) -> usize {
        self.targets.push(TargetDef::new(render_target_name));
        self.targets.len() - 1
    }

    /// Append a pass to the given target
    pub fn add_pass(&mut self, target: usize, kind: PassKind) -> CompositorResult<&mut PassDef> {
        if target >= self.targets.len() {
            return Err(CompositorError::invalid_configuration(
                format!(
                    "target index {target} is out of range for node '{}' ({} targets)",
                    self.name,
                    self.targets.len()
                ),
                "NodeDef::add_pass",
            ));
        }
        Ok(self.targets[target].add_pass(kind))
    }

    /// Get the target pass groups in declaration order
    #[inline]
    pub fn targets(&self) -> &[TargetDef] {
        &self.targets
    }
}
