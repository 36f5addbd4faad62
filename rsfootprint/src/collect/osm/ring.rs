use geo::{Contains, Coord, LineString, Polygon};

/// Join way segments end to end into closed rings.
///
/// Segments may be traversed in either direction. Chains that never close
/// are dropped.
pub fn assemble_rings(segments: Vec<Vec<Coord<f64>>>) -> Vec<LineString<f64>> {
    let mut pending: Vec<Vec<Coord<f64>>> =
        segments.into_iter().filter(|s| s.len() >= 2).collect();
    let mut rings = Vec::new();

    while let Some(mut chain) = pending.pop() {
        loop {
            if chain.len() >= 4 && chain.first() == chain.last() {
                rings.push(LineString::from(chain));
                break;
            }

            let Some(&end) = chain.last() else { break };
            let next = pending
                .iter()
                .position(|s| s.first() == Some(&end) || s.last() == Some(&end));

            match next {
                Some(idx) => {
                    let mut segment = pending.swap_remove(idx);
                    if segment.first() != Some(&end) {
                        segment.reverse();
                    }
                    chain.extend(segment.into_iter().skip(1));
                }
                None => {
                    log::debug!("Dropping unclosed ring of {} coordinates", chain.len());
                    break;
                }
            }
        }
    }

    rings
}

/// Build polygons from outer rings, attaching each inner ring to the first
/// outer ring containing it. Inner rings may touch their outer ring; those
/// outside every outer ring are dropped.
pub fn rings_to_polygons(
    outers: Vec<LineString<f64>>,
    inners: Vec<LineString<f64>>,
) -> Vec<Polygon<f64>> {
    let mut polygons: Vec<Polygon<f64>> = outers
        .into_iter()
        .map(|outer| Polygon::new(outer, vec![]))
        .collect();

    for inner in inners {
        let hole = Polygon::new(inner, vec![]);
        match polygons
            .iter_mut()
            .find(|p| Polygon::new(p.exterior().clone(), vec![]).contains(&hole))
        {
            Some(polygon) => {
                let (ring, _) = hole.into_inner();
                polygon.interiors_push(ring);
            }
            None => log::debug!("Dropping inner ring outside every outer ring"),
        }
    }

    polygons
}
