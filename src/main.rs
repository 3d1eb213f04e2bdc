//! FlyerKit demo: loads a synthetic flyer on a background thread and drives
//! the view through a short scripted session, printing delegate callbacks.
//!
//! Usage: `flyerkit-demo [config.json]`

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    if let Err(e) = demo::run() {
        eprintln!("Demo error: {}", e);
        std::process::exit(1);
    }
}

// The demo needs threads and a terminal
#[cfg(target_arch = "wasm32")]
fn main() {}

#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use std::cell::{Cell, RefCell};
    use std::error::Error;
    use std::path::Path;
    use std::rc::Rc;
    use std::thread;
    use std::time::Duration;

    use flyerkit::{
        BackgroundFetcher, ContentDescriptor, FetchError, FlyerView, FlyerViewDelegate,
        GestureEvent, LoadState, Point, Rect, Size, TapAnnotation, ViewFrame, ViewerConfig,
    };

    const FRAME: Duration = Duration::from_millis(16);
    const LOAD_TIMEOUT_FRAMES: u32 = 300;

    /// Host side of the session: prints callbacks and queues follow-up zooms.
    #[derive(Default)]
    struct DemoHost {
        pending_toggle: Cell<Option<Point>>,
        scroll_events: Cell<u32>,
        log: RefCell<Vec<String>>,
    }

    impl DemoHost {
        fn say(&self, line: String) {
            println!("{line}");
            self.log.borrow_mut().push(line);
        }
    }

    impl FlyerViewDelegate for DemoHost {
        fn on_single_tap(&self, _view: &FlyerView, annotation: Option<&TapAnnotation>, point: Point) {
            match annotation {
                Some(item) => self.say(format!("tap on item {} at {:.1},{:.1}", item.id, point.x, point.y)),
                None => self.say(format!("tap on empty space at {:.1},{:.1}", point.x, point.y)),
            }
        }

        fn on_double_tap(&self, _view: &FlyerView, _annotation: Option<&TapAnnotation>, point: Point) {
            self.say(format!("double tap at {:.1},{:.1}", point.x, point.y));
            self.pending_toggle.set(Some(point));
        }

        fn on_long_press(&self, _view: &FlyerView, annotation: Option<&TapAnnotation>, _point: Point) {
            self.say(format!("long press, item {:?}", annotation.map(|a| a.id)));
        }

        fn on_scroll_changed(&self, _view: &FlyerView) {
            self.scroll_events.set(self.scroll_events.get() + 1);
        }

        fn on_will_begin_loading(&self, view: &FlyerView) {
            self.say(format!("loading flyer {:?}", view.flyer_id()));
        }

        fn on_did_finish_loading(&self, view: &FlyerView) {
            let size = view.content_size();
            self.say(format!(
                "loaded {}x{} with {} pages",
                size.width,
                size.height,
                view.pages().len()
            ));
        }

        fn on_did_fail_loading(&self, _view: &FlyerView, error: Option<&FetchError>) {
            self.say(format!("load failed: {:?}", error));
        }
    }

    /// Two facing 1000x1400 pages, fetched with a little latency.
    fn synthetic_flyer(request: &flyerkit::FetchRequest) -> Result<ContentDescriptor, FetchError> {
        log::info!("GET {}", request.resource_url("manifest"));
        thread::sleep(Duration::from_millis(80));
        Ok(ContentDescriptor::new(Size::new(2000.0, 1400.0))
            .with_pages(vec![
                Rect::new(0.0, 0.0, 1000.0, 1400.0),
                Rect::new(1000.0, 0.0, 1000.0, 1400.0),
            ])
            .with_source(format!("flyer-{}", request.flyer_id)))
    }

    fn load_config() -> Result<ViewerConfig, Box<dyn Error>> {
        match std::env::args().nth(1) {
            Some(path) => Ok(ViewerConfig::load(Path::new(&path))?),
            None => Ok(ViewerConfig::load_from_default_path().unwrap_or_default()),
        }
    }

    /// Run frames until the zoom animation settles.
    fn settle(view: &mut FlyerView, host: &DemoHost) -> Result<(), Box<dyn Error>> {
        loop {
            if let Some(point) = host.pending_toggle.take() {
                view.toggle_zoom_at(point, true)?;
            }
            if !view.tick() {
                return Ok(());
            }
            thread::sleep(FRAME);
        }
    }

    fn report(view: &FlyerView) {
        let visible = view.visible_content();
        println!(
            "  visible {:.1},{:.1} {:.1}x{:.1} (scale {:.3}, {:.0}% of height)",
            visible.x,
            visible.y,
            visible.width,
            visible.height,
            view.transform().scale(),
            view.visible_fraction() * 100.0
        );
    }

    pub fn run() -> Result<(), Box<dyn Error>> {
        let config = load_config()?;
        env_logger::Builder::new()
            .filter_level(config.log_level.to_level_filter())
            .parse_default_env()
            .format_timestamp_millis()
            .init();

        let fetcher = BackgroundFetcher::spawn(synthetic_flyer)?;
        let mut view = FlyerView::new(config, Box::new(fetcher))?;
        view.set_viewport_frame(Rect::new(0.0, 64.0, 390.0, 780.0))?;

        let host = Rc::new(DemoHost::default());
        view.set_delegate(&host);
        view.set_tap_annotations(Some(vec![
            TapAnnotation::new(101, Rect::new(120.0, 200.0, 300.0, 260.0)),
            TapAnnotation::new(102, Rect::new(1150.0, 900.0, 420.0, 300.0)),
        ]));

        view.set_flyer_id(4821, "https://flyers.example.com/", "v3", None);
        let mut frames = 0;
        while view.load_state().is_loading() {
            if frames == LOAD_TIMEOUT_FRAMES {
                return Err("timed out waiting for the flyer".into());
            }
            view.poll_loading();
            thread::sleep(FRAME);
            frames += 1;
        }
        if let LoadState::Failed(err) = view.load_state() {
            return Err(err.clone().into());
        }
        report(&view);

        // Taps arrive in window coordinates; find where item 101 sits on screen
        let item = view.convert_content_rect(Rect::new(120.0, 200.0, 300.0, 260.0), None);
        view.handle_gesture(GestureEvent::SingleTap(item.center()));

        println!("zooming to page 2");
        view.zoom_to_page(1, true)?;
        settle(&mut view, &host)?;
        report(&view);

        let target = view.convert_content_point(Point::new(1300.0, 1000.0), None);
        view.handle_gesture(GestureEvent::DoubleTap(target));
        settle(&mut view, &host)?;
        report(&view);

        view.handle_gesture(GestureEvent::LongPress(target));
        view.handle_gesture(GestureEvent::DoubleTap(target));
        settle(&mut view, &host)?;
        report(&view);

        // Round trip through a 2x overlay view placed inside the viewport
        let overlay = ViewFrame::new(Point::new(10.0, 74.0), 2.0)?;
        let content = view.convert_point_to_content(Point::new(25.0, 40.0), &overlay);
        println!(
            "overlay (25, 40) is content ({:.2}, {:.2})",
            content.x, content.y
        );

        println!(
            "{} callbacks, {} scroll updates",
            host.log.borrow().len(),
            host.scroll_events.get()
        );
        Ok(())
    }
}
