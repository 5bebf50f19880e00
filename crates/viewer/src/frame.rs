use tracing::{debug, error};

use crate::backend::{GraphicsBackend, WindowContext};
use crate::error::{error_chain, ViewerError};
use crate::generator::Generator;
use crate::state::ViewerState;
use crate::types::{Filter, UNIT_QUAD};

/// Steps of the per-frame pipeline, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStage {
    Setup,
    Generate,
    Draw,
    Present,
}

/// What a single pass through the pipeline achieved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// The image was generated, uploaded, drawn and presented.
    Drawn,
    /// The image was generated while rendering is disabled.
    Generated,
    /// The stage that aborted the frame.
    Failed(FrameStage),
}

/// Runs setup, generate and upload/draw, then presents no matter how far
/// the frame got.
pub(crate) fn run_frame<G: Generator>(
    state: &mut ViewerState<'_, G>,
    ctx: &mut dyn WindowContext,
    clear_color: [f32; 4],
) -> FrameOutcome {
    let outcome = render_stages(state, ctx.graphics(), clear_color);
    if let Err(err) = ctx.swap_buffers() {
        error!(error = %err, "buffer swap failed");
        if !matches!(outcome, FrameOutcome::Failed(_)) {
            return FrameOutcome::Failed(FrameStage::Present);
        }
    }
    outcome
}

fn render_stages<G: Generator>(
    state: &mut ViewerState<'_, G>,
    gfx: &mut dyn GraphicsBackend,
    clear_color: [f32; 4],
) -> FrameOutcome {
    if let Err(err) = setup(state, gfx, clear_color) {
        return abort(FrameStage::Setup, &err);
    }
    if let Err(err) = generate(state) {
        return abort(FrameStage::Generate, &err);
    }
    state.frame_count += 1;

    if !state.rendering_enabled {
        return FrameOutcome::Generated;
    }
    match upload_and_draw(state, gfx) {
        Ok(()) => FrameOutcome::Drawn,
        Err(err) => abort(FrameStage::Draw, &err),
    }
}

fn abort(stage: FrameStage, err: &ViewerError) -> FrameOutcome {
    error!(?stage, error = %error_chain(err), "frame aborted");
    FrameOutcome::Failed(stage)
}

fn setup<G: Generator>(
    state: &ViewerState<'_, G>,
    gfx: &mut dyn GraphicsBackend,
    clear_color: [f32; 4],
) -> Result<(), ViewerError> {
    gfx.set_viewport(state.width, state.height)?;
    gfx.load_unit_projection()?;
    gfx.clear(clear_color)?;
    Ok(())
}

fn generate<G: Generator>(state: &mut ViewerState<'_, G>) -> Result<(), ViewerError> {
    let generator = &mut *state.generator;
    if let Err(source) = generator.recompute_bounds() {
        return Err(handler_failure(generator, source));
    }
    if let Err(source) = generator.generate() {
        return Err(handler_failure(generator, source));
    }
    Ok(())
}

fn handler_failure<G: Generator>(
    generator: &G,
    source: crate::generator::GeneratorError,
) -> ViewerError {
    ViewerError::GeneratorHandlerFailure {
        name: generator.name().to_string(),
        source,
    }
}

fn upload_and_draw<G: Generator>(
    state: &mut ViewerState<'_, G>,
    gfx: &mut dyn GraphicsBackend,
) -> Result<(), ViewerError> {
    let texture = match state.texture {
        Some(texture) => texture,
        None => {
            let texture = gfx.create_texture()?;
            debug!(?texture, "allocated frame texture");
            state.texture = Some(texture);
            texture
        }
    };

    let generator = &*state.generator;
    gfx.upload_rgb(
        texture,
        generator.width(),
        generator.height(),
        generator.buffer(),
        Filter::Linear,
    )?;
    gfx.draw_quad(texture, &UNIT_QUAD)?;
    Ok(())
}
