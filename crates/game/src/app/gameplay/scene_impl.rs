struct LoadedLevel {
    sim: Simulation,
    map_mesh: Mesh,
    tileset: TextureHandle,
    background: TextureHandle,
    font: TextureHandle,
    jump_sound: AudioHandle,
}

/// Side-scrolling platformer scene. Loads one level file; the run ends when
/// the player is caught or every enemy is down.
struct PlatformerScene {
    paths: AppPaths,
    level_path: PathBuf,
    level: Option<LoadedLevel>,
}

impl PlatformerScene {
    fn new(paths: AppPaths, level_path: PathBuf) -> Self {
        Self {
            paths,
            level_path,
            level: None,
        }
    }

    fn load_level_assets(
        &self,
        renderer: &mut dyn RenderBackend,
        audio: &mut dyn AudioBackend,
    ) -> Result<LoadedLevel, SceneLoadError> {
        let def = load_level(&self.paths.asset(&self.level_path))?;
        let mut textures = TextureCache::default();

        let tileset = textures.load(&self.paths, &def.map.tileset, renderer)?;
        let background = textures.load(&self.paths, &def.assets.background, renderer)?;
        let font = textures.load(&self.paths, &def.assets.font, renderer)?;
        let grid = TileGrid::new(
            def.map.width,
            def.map.height,
            def.map.tiles.clone(),
            def.map.tile_size,
            def.map.tileset_columns,
            def.map.tileset_rows,
            tileset,
        )?;

        let player_texture = textures.load(&self.paths, &def.player().texture, renderer)?;
        let player = Actor::from_def(def.player(), player_texture);
        let mut enemies = Vec::with_capacity(def.enemies().len());
        for enemy_def in def.enemies() {
            let texture = textures.load(&self.paths, &enemy_def.texture, renderer)?;
            enemies.push(Actor::from_def(enemy_def, texture));
        }

        let music = audio.load_music(&self.paths.asset(&def.assets.music))?;
        let jump_sound = audio.load_sound(&self.paths.asset(&def.assets.jump_sound))?;
        audio.play_music(music, true);

        let map_mesh = grid.build_mesh();
        Ok(LoadedLevel {
            sim: Simulation::new(grid, player, enemies),
            map_mesh,
            tileset,
            background,
            font,
            jump_sound,
        })
    }
}

/// Uploads each distinct texture path once.
#[derive(Default)]
struct TextureCache {
    loaded: HashMap<PathBuf, TextureHandle>,
}

impl TextureCache {
    fn load(
        &mut self,
        paths: &AppPaths,
        relative: &Path,
        renderer: &mut dyn RenderBackend,
    ) -> Result<TextureHandle, TextureLoadError> {
        if let Some(handle) = self.loaded.get(relative) {
            return Ok(*handle);
        }
        let handle = load_texture(&paths.asset(relative), renderer)?;
        self.loaded.insert(relative.to_path_buf(), handle);
        Ok(handle)
    }
}

impl Scene for PlatformerScene {
    fn load(
        &mut self,
        renderer: &mut dyn RenderBackend,
        audio: &mut dyn AudioBackend,
    ) -> Result<(), SceneLoadError> {
        let level = self.load_level_assets(renderer, audio)?;
        info!(
            level = %self.level_path.display(),
            enemies = level.sim.enemy_count(),
            solid_tiles = level.map_mesh.vertex_count() / 6,
            "platformer_loaded"
        );
        self.level = Some(level);
        Ok(())
    }

    fn update(
        &mut self,
        fixed_dt_seconds: f32,
        input: &InputSnapshot,
        audio: &mut dyn AudioBackend,
    ) {
        let Some(level) = self.level.as_mut() else {
            return;
        };
        let events = level.sim.tick(fixed_dt_seconds, input);
        if events.player_jumped {
            audio.play_sound_once(level.jump_sound);
        }
        for (index, cause) in &events.defeated_enemies {
            let kind = match level.sim.actors[*index].role {
                Role::Enemy(behavior) => behavior.name(),
                Role::Player => "player",
            };
            info!(
                enemy = *index,
                kind,
                cause = ?cause,
                tick = level.sim.tick,
                remaining = level.sim.active_enemy_count(),
                "enemy_defeated"
            );
        }
        if events.player_defeated {
            info!(tick = level.sim.tick, "player_defeated");
        }
    }

    fn render(&mut self, renderer: &mut dyn RenderBackend) {
        let Some(level) = self.level.as_ref() else {
            return;
        };
        let player_position = level.sim.player().body.position;

        renderer.set_view_transform(Transform2D::IDENTITY);
        renderer.set_model_transform(Transform2D::IDENTITY);
        let backdrop = textured_rect(BACKGROUND_HALF_WIDTH, BACKGROUND_HALF_HEIGHT);
        renderer.draw_triangles(&backdrop.positions, &backdrop.uvs, level.background);

        renderer.set_view_transform(Transform2D::translation(-player_position.x, 0.0));
        renderer.draw_triangles(&level.map_mesh.positions, &level.map_mesh.uvs, level.tileset);

        for actor in level.sim.actors.iter().filter(|actor| actor.is_active()) {
            let position = actor.body.position;
            renderer.set_model_transform(
                Transform2D::translation(position.x, position.y)
                    .with_scale(actor.scale.x, actor.scale.y),
            );
            let quad = sprite_quad(
                actor.current_cell(),
                actor.animation.sheet_columns,
                actor.animation.sheet_rows,
            );
            renderer.draw_triangles(&quad.positions, &quad.uvs, actor.texture);
        }

        if let Some(outcome) = level.sim.outcome() {
            renderer.set_model_transform(Transform2D::translation(
                player_position.x + BANNER_OFFSET_X,
                player_position.y + BANNER_OFFSET_Y,
            ));
            let text = text_mesh(
                outcome.banner(),
                BANNER_FONT_SIZE,
                BANNER_SPACING,
                FONT_BANK_SIZE,
            );
            renderer.draw_triangles(&text.positions, &text.uvs, level.font);
        }
    }

    fn outcome(&self) -> Option<Outcome> {
        self.level.as_ref().and_then(|level| level.sim.outcome())
    }

    fn unload(&mut self) {
        if let Some(level) = self.level.take() {
            debug!(ticks = level.sim.tick, "platformer_unloaded");
        }
    }

    fn debug_title(&self) -> Option<String> {
        let level = self.level.as_ref()?;
        Some(format!(
            "Tilehop | enemies {}/{}",
            level.sim.active_enemy_count(),
            level.sim.enemy_count()
        ))
    }
}
