use std::collections::VecDeque;

use life_canvas::{
    render::{ALIVE_COLOR, DEAD_COLOR, GRID_COLOR},
    AnimationController, CanvasBounds, Cell, CellMetrics, Click, FrameOutcome, FrameScheduler,
    InputHandler, LifeError, Palette, Raster, Renderer, Result, Seeding, Universe,
};

/// Host stand-in that fires requests only when the test says so.
#[derive(Default)]
struct TestHost {
    next: u64,
    queue: VecDeque<u64>,
    requests: usize,
}

impl TestHost {
    fn fire(&mut self) -> Option<u64> {
        self.queue.pop_front()
    }
}

impl FrameScheduler for TestHost {
    type Handle = u64;

    fn request_frame(&mut self) -> Result<u64> {
        self.next += 1;
        self.requests += 1;
        self.queue.push_back(self.next);
        Ok(self.next)
    }

    fn cancel_frame(&mut self, handle: u64) {
        self.queue.retain(|&h| h != handle);
    }
}

fn blinker_setup() -> (Universe, Renderer, Raster) {
    let mut universe = Universe::new(5, 5, Seeding::Empty).unwrap();
    universe.set_cells(&[(2, 1), (2, 2), (2, 3)]).unwrap();
    let renderer = Renderer::new(CellMetrics::new(2), Palette::default());
    let raster = Raster::with_size(renderer.metrics().surface_size(5, 5));
    (universe, renderer, raster)
}

fn cell_color(raster: &Raster, renderer: &Renderer, row: u32, col: u32) -> Option<ratatui::style::Color> {
    let (x, y) = renderer.metrics().cell_origin(row, col);
    raster.pixel(x, y)
}

#[test]
fn animation_runs_until_paused() {
    let (mut universe, renderer, mut raster) = blinker_setup();
    let mut controller = AnimationController::new(TestHost::default());

    controller.play().unwrap();
    for expected_generation in 1..=3 {
        let frame = controller.scheduler_mut().fire().unwrap();
        let outcome = controller
            .on_frame(frame, &mut universe, &renderer, &mut raster)
            .unwrap();
        assert!(matches!(outcome, FrameOutcome::Advanced(_)));
        assert_eq!(universe.generation(), expected_generation);
    }

    // Odd generation: the blinker is vertical.
    assert_eq!(cell_color(&raster, &renderer, 1, 2), Some(ALIVE_COLOR));
    assert_eq!(cell_color(&raster, &renderer, 2, 1), Some(DEAD_COLOR));

    controller.pause();
    let frozen = raster.clone();
    while let Some(frame) = controller.scheduler_mut().fire() {
        controller
            .on_frame(frame, &mut universe, &renderer, &mut raster)
            .unwrap();
    }
    assert_eq!(universe.generation(), 3);
    assert_eq!(raster, frozen);
    assert_eq!(controller.scheduler().requests, 4);
}

#[test]
fn click_between_frames_is_seen_by_next_frame() {
    let mut universe = Universe::new(6, 6, Seeding::Empty).unwrap();
    let renderer = Renderer::new(CellMetrics::new(3), Palette::default());
    let (w, h) = renderer.metrics().surface_size(6, 6);
    let mut raster = Raster::with_size((w, h));
    let bounds = CanvasBounds {
        left: 0.0,
        top: 0.0,
        width: w as f64,
        height: h as f64,
    };
    let input = InputHandler::new(bounds, w, h);
    let mut controller = AnimationController::new(TestHost::default());

    // Three clicks along row 1 build a horizontal blinker.
    for col in 1..=3 {
        let x = (col * renderer.metrics().pitch() + 1) as f64;
        let y = (renderer.metrics().pitch() + 1) as f64;
        input
            .on_click(Click::new(x, y), &mut universe, &renderer, &mut raster)
            .unwrap();
    }
    assert_eq!(cell_color(&raster, &renderer, 1, 3), Some(ALIVE_COLOR));
    assert_eq!(universe.generation(), 0);

    controller.play().unwrap();
    let frame = controller.scheduler_mut().fire().unwrap();
    controller
        .on_frame(frame, &mut universe, &renderer, &mut raster)
        .unwrap();

    let alive: Vec<_> = universe.cells_view().positions(Cell::Alive).collect();
    assert_eq!(alive, vec![(0, 2), (1, 2), (2, 2)]);
    assert_eq!(cell_color(&raster, &renderer, 1, 3), Some(DEAD_COLOR));
}

#[test]
fn grid_lines_frame_every_cell() {
    let (universe, renderer, mut raster) = blinker_setup();
    renderer.draw(&mut raster, universe.cells_view());

    let (w, h) = (raster.width(), raster.height());
    assert_eq!((w, h), (16, 16));
    for i in 0..=5 {
        let line = i * renderer.metrics().pitch();
        assert_eq!(raster.pixel(line, 7), Some(GRID_COLOR));
        assert_eq!(raster.pixel(7, line), Some(GRID_COLOR));
    }
}

#[test]
fn out_of_range_edits_are_rejected() {
    let mut universe = Universe::new(4, 4, Seeding::Random { seed: 1 }).unwrap();
    let before = universe.cells_view().as_bytes().to_vec();
    assert!(matches!(
        universe.toggle(4, 0),
        Err(LifeError::OutOfRange { row: 4, col: 0, .. })
    ));
    assert_eq!(universe.cells_view().as_bytes(), before.as_slice());
}
