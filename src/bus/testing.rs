use super::record::Record;
use super::sink::{RecordingSink, RedrawBatch};
use super::{Bus, Command, CommandResponse};
use crate::common::config::{Config, WorkspaceConfig};
use crate::model::focus::FocusState;
use crate::model::geometry::Rect;
use crate::model::server::TreeData;
use crate::model::tree::{ContainerId, ContainerTree};
use crate::sys::screen::ScreenInfo;
use crate::sys::window::WindowHandle;

pub fn screen(id: &str, frame: Rect, scale: f64) -> ScreenInfo { ScreenInfo::new(id, frame, scale) }

pub fn config(names: &[&str]) -> Config {
    Config {
        workspaces: names.iter().map(|&name| WorkspaceConfig { name: name.into() }).collect(),
        ..Config::default()
    }
}

/// A bus with a recording sink and an in-memory command record.
pub struct TestWm {
    pub bus: Bus,
    pub sink: RecordingSink,
}

impl TestWm {
    pub fn new(config: Config) -> Self {
        let sink = RecordingSink::new();
        let bus = Bus::new(config, Box::new(sink.clone())).with_record(Record::in_memory());
        TestWm { bus, sink }
    }

    /// One 1000x800 monitor showing workspace "1".
    pub fn single_monitor() -> Self {
        let mut wm = TestWm::new(config(&["1", "2", "3"]));
        wm.add_monitor(screen("M1", Rect::new(0, 0, 1000, 800), 1.0));
        wm
    }

    pub fn invoke(&mut self, command: Command) -> CommandResponse { self.bus.invoke(command) }

    pub fn tree(&self) -> &ContainerTree { &self.bus.state.tree }

    pub fn focus(&self) -> FocusState { self.bus.state.focus }

    pub fn add_monitor(&mut self, info: ScreenInfo) -> ContainerId {
        let display_id = info.display_id.clone();
        self.invoke(Command::AddMonitor(info)).unwrap();
        self.bus.state.monitors().by_display_id(&display_id).unwrap()
    }

    pub fn workspace(&self, name: &str) -> ContainerId {
        self.bus.state.workspaces().by_name(name).unwrap()
    }

    /// Manages a tiling window and reports it as the OS foreground window.
    pub fn open(&mut self, handle: u64) -> ContainerId { self.open_with(handle, None) }

    pub fn open_floating(&mut self, handle: u64, placement: Rect) -> ContainerId {
        self.open_with(handle, Some(placement))
    }

    fn open_with(&mut self, handle: u64, floating: Option<Rect>) -> ContainerId {
        let handle = WindowHandle::new(handle);
        self.invoke(Command::ManageWindow { handle, floating }).unwrap();
        self.foreground(handle.as_u64());
        self.bus.state.containers().by_handle(handle).unwrap()
    }

    pub fn foreground(&mut self, handle: u64) {
        let handle = Some(WindowHandle::new(handle));
        self.invoke(Command::ForegroundChanged { handle }).unwrap();
    }

    pub fn focus_workspace(&mut self, name: &str) {
        self.invoke(Command::FocusWorkspace { workspace: name.into() }).unwrap();
    }

    pub fn move_focused_to(&mut self, name: &str) -> CommandResponse {
        self.invoke(Command::MoveFocusedWindowToWorkspace { workspace: name.into() })
    }

    pub fn snapshot(&self) -> TreeData { TreeData::build(&self.bus.state) }

    pub fn batches(&self) -> Vec<RedrawBatch> { self.sink.batches() }

    pub fn count_recorded(&self, pred: impl Fn(&Command) -> bool) -> usize {
        self.bus.record().entries().iter().filter(|e| pred(&e.command)).count()
    }
}
