//! GPU-accelerated fixed-radius neighborhood search
//!
//! Every (row, column) pair of the cloud is tested in parallel and the result
//! is written as a bit-packed adjacency matrix. Rows are processed in batches
//! so each dispatch stays within the device's binding and workgroup limits.
//! Distances are computed in single precision.

use crate::device::{storage_entry, uniform_entry, GpuContext};
use crate::utils::{decode_adjacency_rows, first_non_finite, pack_points, words_per_row, workgroup_count};
use keycloud_core::{Error, NeighborhoodIndex, Neighborhoods, Point3d, Result};
use log::debug;

const WORKGROUP_SIZE: usize = 64;

const RADIUS_SEARCH_SHADER: &str = r#"
struct SearchParams {
    num_points: u32,
    row_offset: u32,
    row_count: u32,
    words_per_row: u32,
    radius_sq: f32,
    _pad0: u32,
    _pad1: u32,
    _pad2: u32,
}

@group(0) @binding(0) var<storage, read> points: array<vec4<f32>>;
@group(0) @binding(1) var<storage, read_write> adjacency: array<u32>;
@group(0) @binding(2) var<uniform> params: SearchParams;

@compute @workgroup_size(64)
fn main(@builtin(global_invocation_id) global_id: vec3<u32>) {
    let word = global_id.x;
    let local_row = global_id.y;
    if (word >= params.words_per_row || local_row >= params.row_count) {
        return;
    }

    let center = points[params.row_offset + local_row].xyz;
    let first = word * 32u;
    let last = min(first + 32u, params.num_points);

    var bits = 0u;
    for (var col = first; col < last; col++) {
        let diff = points[col].xyz - center;
        if (dot(diff, diff) <= params.radius_sq) {
            bits |= 1u << (col - first);
        }
    }

    adjacency[local_row * params.words_per_row + word] = bits;
}
"#;

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct SearchParams {
    num_points: u32,
    row_offset: u32,
    row_count: u32,
    words_per_row: u32,
    radius_sq: f32,
    _pad: [u32; 3],
}

/// Rows per dispatch that keep the adjacency binding and the y dimension of
/// the dispatch inside the given limits
pub fn rows_per_batch(num_points: usize, words_per_row: usize, limits: &wgpu::Limits) -> usize {
    let row_bytes = (words_per_row * std::mem::size_of::<u32>()).max(1) as u64;
    let max_binding = (limits.max_storage_buffer_binding_size as u64).min(limits.max_buffer_size);
    let by_binding = (max_binding / row_bytes) as usize;
    let by_dispatch = limits.max_compute_workgroups_per_dimension as usize;
    num_points.min(by_binding).min(by_dispatch)
}

impl GpuContext {
    /// Radius neighborhood of every point, computed on the GPU
    pub async fn radius_neighborhoods(&self, points: &[Point3d], radius: f64) -> Result<Neighborhoods> {
        if !radius.is_finite() || radius <= 0.0 {
            return Err(Error::InvalidInput(format!(
                "search radius must be positive and finite, got {}",
                radius
            )));
        }
        if points.is_empty() {
            return Ok(Neighborhoods::default());
        }

        let limits = self.limits();
        let num_points = points.len();
        let words = words_per_row(num_points);

        let point_data = pack_points(points);
        if let Some(idx) = first_non_finite(&point_data) {
            return Err(Error::InvalidInput(format!(
                "point {} does not fit in single precision: {:?}",
                idx, points[idx]
            )));
        }
        let point_bytes = std::mem::size_of_val(point_data.as_slice()) as u64;
        if point_bytes > limits.max_storage_buffer_binding_size as u64 {
            return Err(Error::Gpu(format!(
                "{} points exceed the device storage binding limit of {} bytes",
                num_points, limits.max_storage_buffer_binding_size
            )));
        }
        if workgroup_count(words, WORKGROUP_SIZE) > limits.max_compute_workgroups_per_dimension {
            return Err(Error::Gpu(format!("{} points exceed the device dispatch limit", num_points)));
        }

        let batch_rows = rows_per_batch(num_points, words, &limits);
        if batch_rows == 0 {
            return Err(Error::Gpu(format!(
                "a single adjacency row for {} points exceeds the device storage binding limit",
                num_points
            )));
        }
        let batch_count = num_points.div_ceil(batch_rows);
        debug!(
            "GPU radius search over {} points: {} rows per batch, {} batches",
            num_points, batch_rows, batch_count
        );

        let points_buffer = self.create_buffer_init(
            "Radius Search Points",
            &point_data,
            wgpu::BufferUsages::STORAGE,
        );

        let adjacency_size = (batch_rows * words * std::mem::size_of::<u32>()) as u64;
        let adjacency_buffer = self.create_buffer(
            "Radius Search Adjacency",
            adjacency_size,
            wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
        );

        let params_buffer = self.create_buffer(
            "Radius Search Params",
            std::mem::size_of::<SearchParams>() as u64,
            wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        );

        let shader = self.create_shader_module("Radius Search", RADIUS_SEARCH_SHADER);
        let bind_group_layout = self.create_bind_group_layout(
            "Radius Search",
            &[storage_entry(0, true), storage_entry(1, false), uniform_entry(2)],
        );
        let pipeline = self.create_compute_pipeline("Radius Search Pipeline", &shader, "main", &bind_group_layout);

        let bind_group = self.create_bind_group(
            "Radius Search",
            &bind_group_layout,
            &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: points_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: adjacency_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: params_buffer.as_entire_binding(),
                },
            ],
        );

        let radius_sq = (radius as f32) * (radius as f32);
        let mut lists: Vec<Vec<usize>> = Vec::with_capacity(num_points);

        for row_offset in (0..num_points).step_by(batch_rows) {
            let row_count = batch_rows.min(num_points - row_offset);
            let params = SearchParams {
                num_points: num_points as u32,
                row_offset: row_offset as u32,
                row_count: row_count as u32,
                words_per_row: words as u32,
                radius_sq,
                _pad: [0; 3],
            };
            self.queue.write_buffer(&params_buffer, 0, bytemuck::bytes_of(&params));

            let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Radius Search"),
            });
            {
                let mut compute_pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                    label: Some("Radius Search Pass"),
                    timestamp_writes: None,
                });
                compute_pass.set_pipeline(&pipeline);
                compute_pass.set_bind_group(0, &bind_group, &[]);
                compute_pass.dispatch_workgroups(workgroup_count(words, WORKGROUP_SIZE), row_count as u32, 1);
            }
            self.queue.submit(std::iter::once(encoder.finish()));

            let batch_bytes = (row_count * words * std::mem::size_of::<u32>()) as u64;
            let batch_words: Vec<u32> = self.read_buffer(&adjacency_buffer, batch_bytes).await?;
            lists.extend(decode_adjacency_rows(&batch_words, words, num_points));
        }

        if lists.len() != num_points {
            return Err(Error::Gpu(format!(
                "GPU radius search returned {} rows for {} points",
                lists.len(),
                num_points
            )));
        }

        Ok(Neighborhoods::from_lists(lists))
    }
}

/// Neighborhood backend running the pairwise search on the GPU.
///
/// Coordinates are narrowed to `f32`; pairs within float round-off of the
/// radius may be classified differently than by the double precision CPU
/// backends.
pub struct GpuRadiusIndex {
    context: GpuContext,
}

impl GpuRadiusIndex {
    /// Acquire a GPU and wrap it as a neighborhood backend
    pub async fn new() -> Result<Self> {
        Ok(Self {
            context: GpuContext::new().await?,
        })
    }

    pub fn from_context(context: GpuContext) -> Self {
        Self { context }
    }

    pub fn context(&self) -> &GpuContext {
        &self.context
    }
}

impl NeighborhoodIndex for GpuRadiusIndex {
    fn name(&self) -> &str {
        "gpu"
    }

    fn radius_neighborhoods(&self, points: &[Point3d], radius: f64) -> Result<Neighborhoods> {
        pollster::block_on(self.context.radius_neighborhoods(points, radius))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_layout_matches_shader() {
        // Uniform buffers are sized in multiples of 16 bytes
        assert_eq!(std::mem::size_of::<SearchParams>(), 32);
    }

    #[test]
    fn test_rows_per_batch_respects_binding_limit() {
        let limits = wgpu::Limits {
            max_storage_buffer_binding_size: 1024,
            ..wgpu::Limits::default()
        };
        // 100 points -> 4 words -> 16 bytes per row -> 64 rows per binding
        assert_eq!(rows_per_batch(100, words_per_row(100), &limits), 64);
    }

    #[test]
    fn test_rows_per_batch_respects_dispatch_limit() {
        let limits = wgpu::Limits {
            max_compute_workgroups_per_dimension: 10,
            ..wgpu::Limits::default()
        };
        assert_eq!(rows_per_batch(100, words_per_row(100), &limits), 10);
    }

    #[test]
    fn test_rows_per_batch_small_cloud() {
        let limits = wgpu::Limits::default();
        assert_eq!(rows_per_batch(5, words_per_row(5), &limits), 5);
    }
}
