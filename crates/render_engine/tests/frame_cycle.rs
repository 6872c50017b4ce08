//! Full frame-timeline integration test
//!
//! Drives the whole cycle the renderer runs per frame: reset phase,
//! mesh-stream flush, draw-surface collection with arena scratch, opaque
//! depth sort, then the ring buffer's map/write/unmap session, ending with
//! the bindings a render pass would submit.

use render_engine::prelude::*;
use render_engine::render::mesh_stream::StreamedMesh;

fn test_config() -> MemoryConfig {
    MemoryConfig::from_toml_str(
        r#"
        frame_arena_bytes = 65536
        surface_pool_capacity = 512
        ring_buffer_bytes = 4096
        stream_vertex_budget = 4096
        stream_index_budget = 1024
        stream_policy = "initial_load_only"
        "#,
    )
    .expect("test config should parse")
}

fn load_meshes(device: &mut HeadlessDevice, config: &MemoryConfig) -> Vec<StreamedMesh> {
    let mut stream = MeshStreamQueue::new(
        device,
        config.stream_vertex_budget,
        config.stream_index_budget,
        config.stream_policy,
    )
    .expect("stream creation");

    for size in [3usize, 24, 8] {
        let vertices: Vec<[f32; 3]> = (0..size).map(|i| [i as f32; 3]).collect();
        let indices: Vec<u32> = (0..size as u32).collect();
        stream
            .queue(PendingMesh::from_slices(&vertices, &indices))
            .expect("queueing during load phase");
    }
    stream.flush(device).expect("initial load flush")
}

#[test]
fn frame_cycle_end_to_end() {
    render_engine::foundation::logging::init_for_tests();
    let mut device = HeadlessDevice::new();
    let config = test_config();

    // One-shot load phase: persistent meshes packed into shared buffers.
    let meshes = load_meshes(&mut device, &config);
    assert_eq!(meshes.len(), 3);

    let mut frame = FrameResources::new(&mut device, &config).expect("frame resources");
    let view_projection = Mat4::new_perspective(16.0 / 9.0, 1.2, 0.1, 500.0);

    let mut first_frame_offsets = Vec::new();

    for frame_number in 1..=3u64 {
        // Reset phase.
        frame.begin_frame();
        assert_eq!(frame.frame_index(), frame_number);

        // Collection phase: arena scratch for culling results, surfaces
        // classified per material.
        let visible = frame.arena().alloc_typed::<u32>(meshes.len());
        for (i, slot) in visible.iter_mut().enumerate() {
            *slot = i as u32;
        }

        let materials = [
            Material::opaque(MaterialId(1)),
            Material::with_queue(MaterialId(2), RenderQueueKind::Transparency),
            Material::opaque(MaterialId(3)),
        ];
        for (i, (mesh, material)) in meshes.iter().zip(&materials).enumerate() {
            let surface = frame.collector_mut().alloc(material).expect("surface slot");
            surface.spatial_handle = i as u32;
            surface.range = DrawRange {
                first_index: 0,
                index_count: mesh.indices.index_count() as u32,
                base_vertex: 0,
            };
            surface.bounds_center = Point3::new(0.0, 0.0, -(i as f32 + 1.0) * 10.0);
        }
        assert_eq!(frame.collector().opaque().len(), 2);
        assert_eq!(frame.collector().transparent().len(), 1);

        // Sort phase.
        frame.collector_mut().sort_opaque(&view_projection);
        let opaque = frame.collector().opaque();
        assert!(opaque[0].bounds_center.z > opaque[1].bounds_center.z);

        // Map/write/unmap session: per-frame overlay geometry.
        let ring = frame.ring_mut();
        ring.map(&mut device).expect("map");
        let overlay_vertices: [[f32; 2]; 4] = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];
        let overlay = ring
            .write_vertices(&device, &overlay_vertices)
            .expect("overlay stream");
        let overlay_indices = ring
            .write_indices(&device, &[0u32, 1, 2, 2, 3, 0])
            .expect("overlay indices");
        ring.unmap(&mut device).expect("unmap");

        // Ring offsets are deterministic frame over frame.
        let offsets = (overlay.offset(), overlay_indices.offset());
        if frame_number == 1 {
            first_frame_offsets.push(offsets);
        } else {
            assert_eq!(offsets, first_frame_offsets[0]);
        }

        // Submission: every reference a pass would bind still resolves.
        for mesh in &meshes {
            assert!(mesh.vertices.binding(&device).is_ok());
            assert!(mesh.indices.binding(&device).is_ok());
        }
        let (ring_buffer, overlay_offset, stride) =
            overlay.binding(&device).expect("overlay binding");
        assert_eq!(stride, 8);
        assert_eq!(overlay_offset, 0);

        // The overlay bytes really landed at the bound offset.
        let written = device
            .read_buffer(ring_buffer, overlay_offset, overlay.size())
            .expect("readback");
        assert_eq!(written, bytemuck::cast_slice::<[f32; 2], u8>(&overlay_vertices));
    }

    frame.destroy(&mut device).expect("teardown");
}

#[test]
fn sealed_stream_rejects_frame_time_uploads() {
    let mut device = HeadlessDevice::new();
    let config = test_config();
    let _meshes = load_meshes(&mut device, &config);

    // The load phase is over; a mid-frame registration must fail loudly
    // rather than recycle regions persistent meshes still reference.
    let mut stream = MeshStreamQueue::new(
        &mut device,
        config.stream_vertex_budget,
        config.stream_index_budget,
        config.stream_policy,
    )
    .expect("stream creation");
    stream
        .queue(PendingMesh::from_slices(&[[0.0f32; 3]], &[0]))
        .expect("first queue");
    stream.flush(&mut device).expect("first flush");

    let second = stream.queue(PendingMesh::from_slices(&[[0.0f32; 3]], &[0]));
    assert!(matches!(second, Err(MemoryError::StreamSealed)));
}
