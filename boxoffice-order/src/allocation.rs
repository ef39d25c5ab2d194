use std::sync::Arc;

use boxoffice_catalog::{FrontCenterAllocator, SequentialAllocator, Venue};
use boxoffice_core::{CoreResult, SeatAllocator};
use boxoffice_store::AllocatorKind;

/// Build the configured allocator over a fresh venue
pub fn build_allocator(kind: AllocatorKind, rows: u32, columns: u32) -> CoreResult<Arc<dyn SeatAllocator>> {
    let venue = Venue::new(rows, columns)?;
    let allocator: Arc<dyn SeatAllocator> = match kind {
        AllocatorKind::Sequential => Arc::new(SequentialAllocator::new(venue)),
        AllocatorKind::FrontAndCenter => Arc::new(FrontCenterAllocator::new(venue)),
    };
    Ok(allocator)
}
