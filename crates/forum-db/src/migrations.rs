use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            name        TEXT NOT NULL,
            email       TEXT NOT NULL UNIQUE,
            role        TEXT NOT NULL DEFAULT 'student',
            avatar      TEXT
        );

        CREATE TABLE IF NOT EXISTS user_details (
            user_id     INTEGER PRIMARY KEY REFERENCES users(id) ON DELETE CASCADE,
            institute   TEXT,
            major       TEXT,
            batch       INTEGER
        );

        CREATE TABLE IF NOT EXISTS categories (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            name        TEXT NOT NULL UNIQUE
        );

        CREATE TABLE IF NOT EXISTS posts (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            author_id       INTEGER NOT NULL REFERENCES users(id),
            category_id     INTEGER NOT NULL REFERENCES categories(id),
            title           TEXT NOT NULL,
            description     TEXT NOT NULL,
            created_at      TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_posts_created
            ON posts(created_at);

        CREATE TABLE IF NOT EXISTS post_images (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            post_id     INTEGER NOT NULL REFERENCES posts(id) ON DELETE CASCADE,
            path        TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_post_images_post
            ON post_images(post_id);

        CREATE TABLE IF NOT EXISTS questionnaires (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            post_id     INTEGER NOT NULL UNIQUE REFERENCES posts(id) ON DELETE CASCADE,
            link        TEXT NOT NULL,
            reward      TEXT
        );

        CREATE TABLE IF NOT EXISTS comments (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            post_id     INTEGER NOT NULL REFERENCES posts(id) ON DELETE CASCADE,
            author_id   INTEGER NOT NULL REFERENCES users(id),
            comment     TEXT NOT NULL,
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_comments_post
            ON comments(post_id);

        CREATE TABLE IF NOT EXISTS post_likes (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            post_id     INTEGER NOT NULL REFERENCES posts(id) ON DELETE CASCADE,
            user_id     INTEGER NOT NULL REFERENCES users(id),
            UNIQUE(post_id, user_id)
        );

        -- Seed the default categories
        INSERT OR IGNORE INTO categories (id, name) VALUES
            (1, 'General'),
            (2, 'Academic'),
            (3, 'Career'),
            (4, 'Research');
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
