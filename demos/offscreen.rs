//! Renders one UI frame into an offscreen texture with the wgpu backend.
//!
//! No window is involved: the render target is a plain texture, so this runs anywhere wgpu can
//! find an adapter.
//!
//! ```bash
//! cargo run --example offscreen
//! ```
//!
//! The UI here is a stand-in for a real immediate-mode library.  It draws two rectangles: one
//! with the font atlas bound, one with a texture registered through the renderer.

use gui_passes::bindings::TextureId;
use gui_passes::images::{Renderer, RendererConfig};
use gui_passes::ui::{DisplayMetrics, DrawCmd, DrawData, DrawList, DrawVert, FontAtlas, UiContext};
use gui_passes::{TextureFormat, WgpuBackend};

const WIDTH: u32 = 320;
const HEIGHT: u32 = 240;

struct DemoUi {
    data: DrawData,
    atlas: Vec<u8>,
    atlas_uploaded: bool,
    image: TextureId,
}

impl DemoUi {
    fn rect(min: [f32; 2], max: [f32; 2], color: u32, texture_id: TextureId) -> DrawList {
        DrawList::new(
            vec![
                DrawVert::new(min, [0.0, 0.0], color),
                DrawVert::new([max[0], min[1]], [1.0, 0.0], color),
                DrawVert::new(max, [1.0, 1.0], color),
                DrawVert::new([min[0], max[1]], [0.0, 1.0], color),
            ],
            vec![0, 1, 2, 0, 2, 3],
            vec![DrawCmd::Elements {
                clip_rect: [0.0, 0.0, WIDTH as f32, HEIGHT as f32],
                texture_id,
                elem_count: 6,
            }],
        )
    }
}

impl UiContext for DemoUi {
    fn set_display_metrics(&mut self, metrics: DisplayMetrics) {
        self.data.display_size = metrics.display_size;
        self.data.framebuffer_scale = metrics.framebuffer_scale;
    }

    fn new_frame(&mut self) {
        self.data.draw_lists = vec![
            Self::rect([10.0, 10.0], [150.0, 110.0], 0xff33_66cc, TextureId::FONT_ATLAS),
            Self::rect([160.0, 120.0], [310.0, 230.0], 0xffff_ffff, self.image),
        ];
    }

    fn finalize_frame(&mut self) -> &DrawData {
        &self.data
    }

    fn font_atlas_dirty(&self) -> bool {
        !self.atlas_uploaded
    }

    fn font_atlas(&mut self) -> FontAtlas<'_> {
        FontAtlas {
            pixels: &self.atlas,
            width: 1,
            height: 1,
        }
    }

    fn set_font_atlas_id(&mut self, _id: TextureId) {
        self.atlas_uploaded = true;
    }
}

fn checkerboard(size: u32) -> Vec<u8> {
    let mut pixels = Vec::with_capacity((size * size * 4) as usize);
    for y in 0..size {
        for x in 0..size {
            let v = if (x / 4 + y / 4) % 2 == 0 { 0xff } else { 0x20 };
            pixels.extend_from_slice(&[v, v, v, 0xff]);
        }
    }
    pixels
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
    let adapter = test_executors::sleep_on(
        instance.request_adapter(&wgpu::RequestAdapterOptions::default()),
    )?;
    let (device, queue) =
        test_executors::sleep_on(adapter.request_device(&wgpu::DeviceDescriptor::default()))?;
    let backend = WgpuBackend::new(device, queue);

    let target = backend.device().create_texture(&wgpu::TextureDescriptor {
        label: Some("offscreen target"),
        size: wgpu::Extent3d {
            width: WIDTH,
            height: HEIGHT,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: TextureFormat::Rgba8Unorm.wgpu_format(),
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    let target_view = target.create_view(&wgpu::TextureViewDescriptor::default());

    let image_size = 16;
    let image = backend.device().create_texture(&wgpu::TextureDescriptor {
        label: Some("checkerboard"),
        size: wgpu::Extent3d {
            width: image_size,
            height: image_size,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8Unorm,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });
    gui_passes::Backend::write_texture(
        &backend,
        &image,
        &checkerboard(image_size),
        gui_passes::TexelLayout {
            bytes_per_row: image_size * 4,
            width: image_size,
            height: image_size,
        },
    );

    let ui = DemoUi {
        data: DrawData::default(),
        atlas: vec![0xff; 4],
        atlas_uploaded: false,
        image: TextureId::NULL,
    };
    let config = RendererConfig::new(TextureFormat::Rgba8Unorm).with_label("offscreen");
    let mut renderer = Renderer::new(backend, ui, config, WIDTH, HEIGHT)?;
    let image_id = renderer.get_or_create_texture_binding(&image)?;
    renderer.ui_mut().image = image_id;

    renderer.update(1.0 / 60.0)?;
    let mut encoder = renderer
        .backend()
        .device()
        .create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("offscreen frame"),
        });
    let stats = {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("offscreen ui"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &target_view,
                depth_slice: None,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        renderer.render(&mut pass)?
    };
    renderer.backend().queue().submit([encoder.finish()]);
    renderer.backend().device().poll(wgpu::PollType::Wait)?;

    logwise::info_sync!(
        "rendered {draws} draws ({vertices} vertices)",
        draws = stats.draw_calls,
        vertices = stats.vertex_count
    );
    println!(
        "rendered {} draws, {} vertices, {} indices",
        stats.draw_calls, stats.vertex_count, stats.index_count
    );

    renderer.release_texture_binding(&image);
    renderer.release_all();
    Ok(())
}
