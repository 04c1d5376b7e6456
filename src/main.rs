//! Nutri-Run entry point
//!
//! The wasm build drives the DOM screens; the native build plays a headless
//! demo round.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::rc::{Rc, Weak};
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, Element, HtmlElement, HtmlInputElement, MouseEvent};

    use nutri_run::rewards::{Celebration, REWARD_TABLE, celebration, gift_eligible};
    use nutri_run::sim::{ClickOutcome, FeedbackKind, Game, GameEvent};
    use nutri_run::{Catalog, Player, RewardTier, Tuning};

    /// Frame deltas above this are treated as a stall (tab switch, debugger)
    const MAX_FRAME_MS: f64 = 100.0;

    const CONFETTI_COLORS: [&str; 5] = ["#1c9c6c", "#f59e0b", "#3b82f6", "#ef4444", "#a855f7"];

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Screen {
        Intro,
        Rewards,
        Playing,
        Result,
    }

    impl Screen {
        fn element_id(&self) -> &'static str {
            match self {
                Screen::Intro => "intro",
                Screen::Rewards => "rewards",
                Screen::Playing => "game",
                Screen::Result => "result",
            }
        }
    }

    /// DOM node for one live bubble
    struct BubbleView {
        el: HtmlElement,
        _on_click: Closure<dyn FnMut(MouseEvent)>,
    }

    /// Browser state around the simulation
    struct Shell {
        game: Game,
        screen: Screen,
        last_time: f64,
        /// Sub-millisecond remainder carried between frames
        accumulator: f64,
        views: HashMap<u64, BubbleView>,
        player: Option<Player>,
        this: Weak<RefCell<Shell>>,
    }

    fn document() -> Option<Document> {
        web_sys::window()?.document()
    }

    fn by_id(id: &str) -> Option<Element> {
        document()?.get_element_by_id(id)
    }

    fn set_text(id: &str, text: &str) {
        if let Some(el) = by_id(id) {
            el.set_text_content(Some(text));
        }
    }

    fn set_hidden(id: &str, hidden: bool) {
        if let Some(el) = by_id(id) {
            let _ = if hidden {
                el.class_list().add_1("hidden")
            } else {
                el.class_list().remove_1("hidden")
            };
        }
    }

    fn input_value(id: &str) -> String {
        by_id(id)
            .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
            .map(|input| input.value())
            .unwrap_or_default()
    }

    impl Shell {
        fn show(&mut self, screen: Screen) {
            for s in [Screen::Intro, Screen::Rewards, Screen::Playing, Screen::Result] {
                set_hidden(s.element_id(), s != screen);
            }
            self.screen = screen;
        }

        fn start_round(&mut self) {
            self.remove_all_views();
            clear_confetti();
            if let Some(area) = by_id("play-area") {
                let width = area.client_width();
                if width > 0 {
                    self.game.set_area_width(width as f32);
                }
            }
            self.game.start_round();
            self.last_time = 0.0;
            self.accumulator = 0.0;

            if let Some(objective) = self.game.objective() {
                set_text("objective-title", &objective.title);
                set_text("objective-description", &objective.description);
                if let (Some(doc), Some(targets)) = (document(), by_id("objective-targets")) {
                    targets.set_inner_html("");
                    for name in &objective.targets {
                        if let Ok(chip) = doc.create_element("span") {
                            chip.set_class_name("target-chip");
                            chip.set_text_content(Some(name));
                            let _ = targets.append_child(&chip);
                        }
                    }
                }
            }
            self.show(Screen::Playing);
            self.apply_events();
        }

        fn finish_round(&mut self, score: u32) {
            self.game.teardown();
            self.game.drain_events();
            self.remove_all_views();

            let tier = RewardTier::for_score(score);
            set_text("final-score", &format!("{} points", score));
            set_text("result-headline", tier.headline());
            set_text("result-message", tier.message());
            set_hidden("gift-notice", !gift_eligible(score));
            log::info!("Result: {} points ({:?})", score, tier);
            self.show(Screen::Result);
            if let Some(burst) = celebration(score) {
                celebrate(burst);
            }
        }

        /// Run simulation time for this frame
        fn update(&mut self, time: f64) {
            let dt = if self.last_time > 0.0 {
                (time - self.last_time).clamp(0.0, MAX_FRAME_MS)
            } else {
                0.0
            };
            self.last_time = time;

            self.accumulator += dt;
            let whole_ms = self.accumulator.floor();
            self.accumulator -= whole_ms;
            self.game.advance(whole_ms as u64);
            self.apply_events();
            self.position_bubbles();
        }

        /// Mirror drained simulation events into the DOM
        fn apply_events(&mut self) {
            for event in self.game.drain_events() {
                match event {
                    GameEvent::TimeChanged(t) => set_text("hud-time", &format!("⏱ Temps : {}s", t)),
                    GameEvent::ScoreChanged(s) => set_text("hud-score", &s.to_string()),
                    GameEvent::BubbleSpawned { id, .. } => self.create_view(id),
                    GameEvent::BubbleRemoved { id, .. } => {
                        if let Some(view) = self.views.remove(&id) {
                            view.el.remove();
                        }
                    }
                    GameEvent::FeedbackShown(kind) => {
                        if let (Some(el), Some(feedback)) = (by_id("feedback"), self.game.feedback()) {
                            el.set_text_content(Some(feedback.message));
                            el.set_class_name(match kind {
                                FeedbackKind::Good => "feedback good",
                                FeedbackKind::Bad => "feedback bad",
                            });
                        }
                    }
                    GameEvent::FeedbackCleared => {
                        if let Some(el) = by_id("feedback") {
                            el.set_text_content(None);
                            el.set_class_name("feedback");
                        }
                    }
                    GameEvent::RoundEnded { score } => {
                        self.finish_round(score);
                        return;
                    }
                    GameEvent::RoundStarted { .. } => {}
                }
            }
        }

        fn create_view(&mut self, id: u64) {
            let Some(bubble) = self.game.bubbles().iter().find(|b| b.id == id) else {
                return;
            };
            let (Some(doc), Some(area)) = (document(), by_id("play-area")) else {
                return;
            };
            let Ok(el) = doc.create_element("div") else {
                return;
            };
            let Ok(el) = el.dyn_into::<HtmlElement>() else {
                return;
            };
            el.set_class_name("bubble");
            el.set_inner_html(
                "<span class=\"bubble-name\"></span><span class=\"bubble-label\"></span>",
            );
            if let Some(name) = el.first_element_child() {
                name.set_text_content(Some(&bubble.item.name));
            }
            if let Some(label) = el.last_element_child() {
                label.set_text_content(Some(&bubble.item.label));
            }
            let _ = el.style().set_property("left", &format!("{}px", bubble.left));

            let shell = self.this.clone();
            let on_click = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                let Some(shell) = shell.upgrade() else { return };
                let mut s = shell.borrow_mut();
                if let ClickOutcome::Scored { is_good, .. } = s.game.click(id) {
                    if let Some(view) = s.views.get(&id) {
                        let class = if is_good { "hit-good" } else { "hit-bad" };
                        let _ = view.el.class_list().add_1(class);
                    }
                }
            });
            let _ = el.add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref());
            let _ = area.append_child(&el);
            self.views.insert(id, BubbleView { el, _on_click: on_click });
        }

        fn position_bubbles(&self) {
            let tuning = self.game.tuning();
            let now = self.game.now_ms();
            for bubble in self.game.bubbles() {
                if let Some(view) = self.views.get(&bubble.id) {
                    let pos = bubble.position(now, tuning.fall_duration_ms, tuning.area_height);
                    let _ = view
                        .el
                        .style()
                        .set_property("transform", &format!("translateY({}px)", pos.y));
                }
            }
        }

        fn remove_all_views(&mut self) {
            for (_, view) in self.views.drain() {
                view.el.remove();
            }
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Nutri-Run starting...");

        let seed = js_sys::Date::now() as u64;
        let game = match Game::new(Catalog::default(), Tuning::load(), seed) {
            Ok(game) => game,
            Err(e) => {
                log::error!("Invalid tuning: {}", e);
                return;
            }
        };
        log::info!("Game initialized with seed: {}", seed);

        let shell = Rc::new_cyclic(|this| {
            RefCell::new(Shell {
                game,
                screen: Screen::Intro,
                last_time: 0.0,
                accumulator: 0.0,
                views: HashMap::new(),
                player: Player::load_last(),
                this: this.clone(),
            })
        });

        // Prefill the form with the last participant
        if let Some(player) = shell.borrow().player.as_ref() {
            for (id, value) in [("player-name", &player.name), ("player-phone", &player.phone)] {
                if let Some(input) = by_id(id).and_then(|el| el.dyn_into::<HtmlInputElement>().ok()) {
                    input.set_value(value);
                }
            }
        }

        fill_reward_table();
        setup_buttons(shell.clone());
        shell.borrow_mut().show(Screen::Intro);

        request_animation_frame(shell);

        log::info!("Nutri-Run running!");
    }

    /// Scatter confetti pieces from the burst origin; CSS animates them out
    fn celebrate(burst: Celebration) {
        let (Some(doc), Some(layer)) = (document(), by_id("confetti")) else {
            return;
        };
        clear_confetti();
        for i in 0..burst.particles {
            let Some(piece) = doc
                .create_element("span")
                .ok()
                .and_then(|el| el.dyn_into::<HtmlElement>().ok())
            else {
                continue;
            };
            piece.set_class_name("confetti");

            let angle = ((js_sys::Math::random() - 0.5) * burst.spread_deg).to_radians();
            let distance = 120.0 + js_sys::Math::random() * 180.0;
            let style = piece.style();
            let _ = style.set_property("top", &format!("{}%", burst.origin_y * 100.0));
            let _ = style.set_property("background", CONFETTI_COLORS[i as usize % CONFETTI_COLORS.len()]);
            let _ = style.set_property("--dx", &format!("{:.0}px", angle.sin() * distance));
            let _ = style.set_property("--dy", &format!("{:.0}px", -angle.cos() * distance));
            let _ = style.set_property(
                "animation-delay",
                &format!("{:.0}ms", js_sys::Math::random() * 150.0),
            );
            let _ = layer.append_child(&piece);
        }
    }

    fn clear_confetti() {
        if let Some(layer) = by_id("confetti") {
            layer.set_inner_html("");
        }
    }

    fn fill_reward_table() {
        let (Some(doc), Some(list)) = (document(), by_id("reward-list")) else {
            return;
        };
        for (range, tier) in REWARD_TABLE {
            if let Ok(row) = doc.create_element("li") {
                row.set_text_content(Some(&format!("{} → {}", range, tier.gift())));
                let _ = list.append_child(&row);
            }
        }
    }

    fn on_click(id: &str, shell: Rc<RefCell<Shell>>, handler: fn(&mut Shell)) {
        if let Some(btn) = by_id(id) {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                handler(&mut shell.borrow_mut());
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_buttons(shell: Rc<RefCell<Shell>>) {
        on_click("start-btn", shell.clone(), |s| {
            match Player::register(&input_value("player-name"), &input_value("player-phone")) {
                Ok(player) => {
                    set_hidden("form-error", true);
                    player.save_last();
                    log::info!("Player registered: {}", player.name);
                    s.player = Some(player);
                    s.start_round();
                }
                Err(e) => {
                    set_text("form-error", &e.to_string());
                    set_hidden("form-error", false);
                }
            }
        });
        on_click("rewards-btn", shell.clone(), |s| s.show(Screen::Rewards));
        on_click("back-btn", shell.clone(), |s| s.show(Screen::Intro));
        on_click("replay-btn", shell, |s| s.start_round());
    }

    fn request_animation_frame(shell: Rc<RefCell<Shell>>) {
        let Some(window) = web_sys::window() else { return };
        let closure = Closure::once(move |time: f64| {
            game_loop(shell, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(shell: Rc<RefCell<Shell>>, time: f64) {
        {
            let mut s = shell.borrow_mut();
            if s.screen == Screen::Playing {
                s.update(time);
            }
        }

        request_animation_frame(shell);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use nutri_run::sim::{ClickOutcome, Game};
    use nutri_run::{Catalog, RewardTier, Tuning};

    env_logger::init();
    log::info!("Nutri-Run (native) starting...");
    log::info!("The playable version runs in the browser - build with `trunk serve`");

    // Headless demo round: click every good bubble as soon as it appears
    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(2024);
    let mut game = match Game::new(Catalog::default(), Tuning::load(), seed) {
        Ok(game) => game,
        Err(e) => {
            log::error!("Invalid tuning: {}", e);
            return;
        }
    };
    game.start_round();

    let frame_ms = 16;
    while game.is_running() {
        let good: Vec<u64> = game
            .bubbles()
            .iter()
            .filter(|b| b.is_good && !b.resolved)
            .map(|b| b.id)
            .collect();
        for id in good {
            if let ClickOutcome::Scored { score, .. } = game.click(id) {
                log::debug!("Clicked bubble {} -> score {}", id, score);
            }
        }
        game.advance(frame_ms);
    }
    game.teardown();

    let score = game.score();
    let tier = RewardTier::for_score(score);
    println!("Demo round finished: {} points - {}", score, tier.headline());
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
