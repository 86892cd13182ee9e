use pokedex_rendering_macroquad::{edit_search, VisibilityLatch};

fn replay(frames: &[Option<Vec<usize>>]) -> Vec<Option<Vec<usize>>> {
    let mut latch = VisibilityLatch::default();
    let mut reports = Vec::new();
    for drawn in frames {
        reports.push(latch.take());
        if let Some(visible) = drawn {
            latch.register(visible.clone());
        }
    }

    // Flush the final frame's measurement so the harness observes it.
    reports.push(latch.take());
    reports
}

#[test]
fn each_frame_reports_what_the_previous_frame_drew() {
    let frames = [None, Some(vec![0, 1, 2]), Some(vec![2, 3]), None];
    let expected = vec![None, None, Some(vec![0, 1, 2]), Some(vec![2, 3]), None];

    let first_run = replay(&frames);
    let second_run = replay(&frames);

    assert_eq!(first_run, expected);
    assert_eq!(first_run, second_run);
}

#[test]
fn search_edits_replay_to_the_same_term() {
    let keystrokes: [(&[char], usize); 4] = [
        (&['p', 'i'], 0),
        (&['k', 'x'], 0),
        (&[], 1),
        (&['a'], 0),
    ];

    let mut term = String::new();
    for (typed, backspaces) in keystrokes {
        if let Some(edited) = edit_search(&term, typed, backspaces) {
            term = edited;
        }
    }

    assert_eq!(term, "pika");
}
