mod actor;
mod combat;
mod events;
mod level;
mod monster;
mod play_scene;
mod player;
mod title_scene;
mod world;

use engine::Scene;

pub(crate) use play_scene::PlaySettings;

/// Title and play scenes, in that order.
pub(crate) fn build_scenes(settings: PlaySettings) -> (Box<dyn Scene>, Box<dyn Scene>) {
    let width = settings.viewport.x as u32;
    let height = settings.viewport.y as u32;
    let title = title_scene::TitleScene::new(width, height);
    let play = play_scene::PlayScene::new(settings);
    (Box::new(title), Box::new(play))
}
